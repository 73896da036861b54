// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{
    position::PositionSample,
    provider::{AccuracyClass, PowerClass, ProviderDescriptor, ProviderId},
};

/// Latitude of the reference location used by the sample helpers.
pub const REFERENCE_LATITUDE: f64 = 52.0270889;
/// Longitude of the reference location used by the sample helpers.
pub const REFERENCE_LONGITUDE: f64 = 11.2803483;

/// Creates a sample at the reference location.
pub fn sample(timestamp: i64, accuracy: f32, provider: &str) -> PositionSample {
    PositionSample::new(
        timestamp,
        REFERENCE_LATITUDE,
        REFERENCE_LONGITUDE,
        accuracy,
        Some(ProviderId::new(provider)),
    )
}

/// Creates a sample at the reference location without provider.
pub fn anonymous_sample(timestamp: i64, accuracy: f32) -> PositionSample {
    PositionSample::new(
        timestamp,
        REFERENCE_LATITUDE,
        REFERENCE_LONGITUDE,
        accuracy,
        None,
    )
}

/// Creates a sample that is moved `north_m` meters north of the reference location.
pub fn sample_north_of_reference(
    timestamp: i64,
    accuracy: f32,
    provider: &str,
    north_m: f64,
) -> PositionSample {
    PositionSample::new(
        timestamp,
        REFERENCE_LATITUDE + north_m / 111300.0,
        REFERENCE_LONGITUDE,
        accuracy,
        Some(ProviderId::new(provider)),
    )
}

/// The satellite provider as it is found on most devices.
pub fn gps_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(ProviderId::gps(), AccuracyClass::Fine, PowerClass::High)
}

/// The cell/wifi provider as it is found on most devices.
pub fn network_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(
        ProviderId::network(),
        AccuracyClass::Coarse,
        PowerClass::Low,
    )
}

/// The passive provider, it never requests fixes by itself.
pub fn passive_descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(
        ProviderId::passive(),
        AccuracyClass::Coarse,
        PowerClass::Low,
    )
}
