// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Pairwise quality arbitration of position samples.
//!
//! Recency and accuracy are weighed together. A much newer sample always wins,
//! a much older one always loses. In between, the more accurate sample wins and
//! a newer but slightly worse sample is only taken from the provider that
//! produced the incumbent.

use common::position::PositionSample;
use serde::{Deserialize, Serialize};

/// Thresholds used by the arbiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Time difference in milliseconds after which a sample is significantly newer or older.
    pub significant_time_delta_ms: i64,
    /// Accuracy difference in meters after which a sample is significantly less accurate.
    pub significant_accuracy_delta: i64,
}

impl ArbiterConfig {
    pub const DEFAULT_SIGNIFICANT_TIME_DELTA_MS: i64 = 120_000;
    pub const DEFAULT_SIGNIFICANT_ACCURACY_DELTA: i64 = 200;
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        ArbiterConfig {
            significant_time_delta_ms: Self::DEFAULT_SIGNIFICANT_TIME_DELTA_MS,
            significant_accuracy_delta: Self::DEFAULT_SIGNIFICANT_ACCURACY_DELTA,
        }
    }
}

/// Age of a candidate sample relative to an incumbent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recency {
    /// Newer by more than the significant time delta.
    SignificantlyNewer,
    Newer,
    /// Same timestamp.
    Same,
    Older,
    /// Older by more than the significant time delta.
    SignificantlyOlder,
}

impl Recency {
    /// Classifies the time difference `candidate - incumbent` in milliseconds.
    pub fn classify(time_delta_ms: i64, config: &ArbiterConfig) -> Recency {
        let threshold = config.significant_time_delta_ms;
        if time_delta_ms > threshold {
            Recency::SignificantlyNewer
        } else if time_delta_ms < -threshold {
            Recency::SignificantlyOlder
        } else if time_delta_ms > 0 {
            Recency::Newer
        } else if time_delta_ms < 0 {
            Recency::Older
        } else {
            Recency::Same
        }
    }

    /// Classifies `candidate` relative to `incumbent`.
    pub fn of(
        candidate: &PositionSample,
        incumbent: &PositionSample,
        config: &ArbiterConfig,
    ) -> Recency {
        Recency::classify(
            candidate.timestamp().saturating_sub(incumbent.timestamp()),
            config,
        )
    }

    /// Returns `true` for both newer classes.
    pub fn is_newer(&self) -> bool {
        matches!(self, Recency::SignificantlyNewer | Recency::Newer)
    }
}

/// Returns `true` if `candidate` shall replace `incumbent` with the default thresholds.
///
/// A candidate always wins against an absent incumbent. A sample never wins
/// against an identical incumbent.
pub fn is_better(candidate: &PositionSample, incumbent: Option<&PositionSample>) -> bool {
    is_better_with(&ArbiterConfig::default(), candidate, incumbent)
}

/// Returns `true` if `candidate` shall replace `incumbent`.
///
/// The rules are evaluated in order and the first matching rule decides:
/// 1. No incumbent: the candidate wins.
/// 2. Significantly newer wins, significantly older loses.
/// 3. Strictly more accurate wins.
/// 4. Newer and not less accurate wins. Newer and not significantly less
///    accurate wins if both samples come from the same provider.
/// 5. Otherwise the candidate loses.
pub fn is_better_with(
    config: &ArbiterConfig,
    candidate: &PositionSample,
    incumbent: Option<&PositionSample>,
) -> bool {
    let Some(incumbent) = incumbent else {
        return true;
    };

    let recency = Recency::of(candidate, incumbent, config);
    match recency {
        Recency::SignificantlyNewer => return true,
        Recency::SignificantlyOlder => return false,
        _ => (),
    }

    // Truncated towards zero, sub-meter improvements don't count.
    let accuracy_delta = (candidate.accuracy() - incumbent.accuracy()) as i64;
    if accuracy_delta < 0 {
        return true;
    }

    let is_newer = recency.is_newer();
    let is_less_accurate = accuracy_delta > 0;
    let is_significantly_less_accurate = accuracy_delta > config.significant_accuracy_delta;
    let is_same_provider = candidate
        .provider()
        .is_some_and(|provider| Some(provider) == incumbent.provider());

    if is_newer && !is_less_accurate {
        return true;
    }
    is_newer && !is_significantly_less_accurate && is_same_provider
}

/// Returns `true` if the sample is accurate enough to be forwarded to a consumer.
pub fn is_acceptable(sample: &PositionSample, desired_accuracy: f32) -> bool {
    sample.accuracy() <= desired_accuracy
}

/// Selects the best of `samples` by folding them through [`is_better_with`].
///
/// The fold starts without incumbent, so the first sample is always taken.
/// On ties the earlier sample is kept.
pub fn best_sample<I>(config: &ArbiterConfig, samples: I) -> Option<PositionSample>
where
    I: IntoIterator<Item = PositionSample>,
{
    samples.into_iter().fold(None, |best, sample| {
        if is_better_with(config, &sample, best.as_ref()) {
            Some(sample)
        } else {
            best
        }
    })
}
