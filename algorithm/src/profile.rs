// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Static lookup tables that translate an [`AccuracyProfile`] into provider
//! requirements.

use common::options::AccuracyProfile;
use common::provider::{AccuracyClass, Criteria, HorizontalAccuracy, PowerClass};

/// Desired accuracy in meters if no profile was requested.
pub const UNSPECIFIED_DESIRED_ACCURACY: f32 = 100.0;

/// Desired accuracy in meters, indexed by [`AccuracyProfile`].
const DESIRED_ACCURACY: [f32; 5] = [
    1000.0, // lowest
    500.0,  // low
    250.0,  // medium
    50.0,   // best
    50.0,   // bestForNavigation
];

const NO_REQUIREMENT: Criteria = Criteria {
    accuracy: None,
    horizontal_accuracy: None,
    power: None,
};

const FINE_HIGH_POWER: Criteria = Criteria {
    accuracy: Some(AccuracyClass::Fine),
    horizontal_accuracy: Some(HorizontalAccuracy::High),
    power: Some(PowerClass::High),
};

/// Provider criteria, indexed by [`AccuracyProfile`].
const CRITERIA: [Criteria; 5] = [
    NO_REQUIREMENT,
    Criteria {
        accuracy: Some(AccuracyClass::Coarse),
        horizontal_accuracy: Some(HorizontalAccuracy::Low),
        power: Some(PowerClass::Low),
    },
    Criteria {
        accuracy: Some(AccuracyClass::Coarse),
        horizontal_accuracy: Some(HorizontalAccuracy::Medium),
        power: Some(PowerClass::Medium),
    },
    FINE_HIGH_POWER,
    FINE_HIGH_POWER,
];

/// Returns the largest accuracy radius in meters a sample may have to be
/// forwarded for `profile`.
pub fn desired_accuracy(profile: Option<AccuracyProfile>) -> f32 {
    profile.map_or(UNSPECIFIED_DESIRED_ACCURACY, |profile| {
        DESIRED_ACCURACY[profile as usize]
    })
}

/// Returns the provider criteria for `profile`.
pub fn criteria_for(profile: AccuracyProfile) -> Criteria {
    CRITERIA[profile as usize]
}
