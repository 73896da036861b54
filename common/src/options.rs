// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::LocationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, FromRepr};

/// Requested trade-off between positional precision and power/latency cost.
///
/// The variants are ordered from the cheapest to the most precise profile.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum AccuracyProfile {
    Lowest = 0,
    Low = 1,
    Medium = 2,
    #[default]
    Best = 3,
    BestForNavigation = 4,
}

impl AccuracyProfile {
    /// Parses a profile from its name, e.g. `medium` or `bestForNavigation`,
    /// or from its numeric index.
    pub fn parse(name: &str) -> Result<Self, LocationError> {
        let name = name.trim();
        if let Ok(index) = name.parse::<u8>() {
            return AccuracyProfile::try_from(index);
        }
        AccuracyProfile::from_str(name).map_err(|_| LocationError::InvalidProfile(name.to_string()))
    }
}

impl TryFrom<u8> for AccuracyProfile {
    type Error = LocationError;

    /// Converts the numeric index (0 = lowest .. 4 = bestForNavigation) into a profile.
    fn try_from(index: u8) -> Result<Self, Self::Error> {
        AccuracyProfile::from_repr(index)
            .ok_or_else(|| LocationError::InvalidProfile(format!("index {index}")))
    }
}

/// Options of a tracking session.
///
/// A `time_interval_ms` or `distance_filter_m` of zero delivers every update
/// of the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationOptions {
    pub accuracy: AccuracyProfile,
    pub time_interval_ms: u64,
    pub distance_filter_m: f32,
}

impl LocationOptions {
    /// Creates options for `accuracy` that deliver every update.
    pub fn new(accuracy: AccuracyProfile) -> Self {
        LocationOptions {
            accuracy,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Checks that the options can be handed to a location provider.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The options are usable.
    /// * `Err(LocationError::InvalidProfile)` - The distance filter is negative or not finite.
    pub fn validate(&self) -> Result<(), LocationError> {
        if !self.distance_filter_m.is_finite() || self.distance_filter_m < 0.0 {
            return Err(LocationError::InvalidProfile(format!(
                "distance filter {} is not a non-negative number of meters",
                self.distance_filter_m
            )));
        }
        Ok(())
    }
}
