// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::provider::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single position fix reported by a location provider.
///
/// A sample is immutable once produced. Consumers that want to keep a sample
/// around share it through an [`std::sync::Arc`] instead of copying or mutating it.
///
/// # Fields
///
/// - `timestamp` – Event time of the fix in milliseconds.
/// - `latitude` – The latitude in decimal degrees (positive for north, negative for south).
/// - `longitude` – The longitude in decimal degrees (positive for east, negative for west).
/// - `accuracy` – Horizontal accuracy radius in meters. Smaller is better.
/// - `provider` – The provider that produced the fix, if known.
///
/// # Example
///
/// ```rust
/// use common::position::PositionSample;
/// use common::provider::ProviderId;
///
/// let sample = PositionSample::new(1000, 52.0266, 11.2825, 12.5, Some(ProviderId::gps()));
/// assert_eq!(sample.accuracy(), 12.5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    timestamp: i64,
    latitude: f64,
    longitude: f64,
    accuracy: f32,
    #[serde(default)]
    provider: Option<ProviderId>,
}

impl PositionSample {
    /// Creates a new [`PositionSample`].
    ///
    /// # Arguments
    ///
    /// * `timestamp` – Event time of the fix in milliseconds.
    /// * `latitude` – Latitude in decimal degrees.
    /// * `longitude` – Longitude in decimal degrees.
    /// * `accuracy` – Horizontal accuracy radius in meters.
    /// * `provider` – Originating provider, `None` if unknown.
    pub fn new(
        timestamp: i64,
        latitude: f64,
        longitude: f64,
        accuracy: f32,
        provider: Option<ProviderId>,
    ) -> PositionSample {
        PositionSample {
            timestamp,
            latitude,
            longitude,
            accuracy,
            provider,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the event time of the fix in milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the event time as UTC date time.
    ///
    /// Returns `None` if the timestamp is out of the range chrono can represent.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    /// Returns the latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the horizontal accuracy radius in meters.
    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    /// Returns the provider that produced this sample.
    pub fn provider(&self) -> Option<&ProviderId> {
        self.provider.as_ref()
    }
}

/// Represents a geographical coordinate with latitude and longitude.
///
/// Used where only the location of a fix matters, e.g. when measuring the
/// displacement between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Position {
            latitude,
            longitude,
        }
    }
}

impl From<&PositionSample> for Position {
    fn from(sample: &PositionSample) -> Self {
        Position::new(sample.latitude, sample.longitude)
    }
}
