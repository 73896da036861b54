// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Algorithms of the geolocator
//!
//! Everything in here is free of side effects: the quality arbitration of
//! position samples, the profile lookup tables and the provider preference.

use common::position::Position;

pub mod arbiter;
pub mod profile;
pub mod selection;

pub use arbiter::{ArbiterConfig, Recency, best_sample, is_acceptable, is_better, is_better_with};
pub use profile::{criteria_for, desired_accuracy};
pub use selection::prefer_provider;

/// Returns the distance in meters between two positions given in degrees.
///
/// Uses the equirectangular approximation, the earth is treated as flat around
/// the two positions. Good enough for the displacement between two consecutive
/// samples, not for long distances.
pub fn calculate_distance(pos1: &Position, pos2: &Position) -> f64 {
    let lat = (pos1.latitude + pos2.latitude) / 2.0 * 0.01745;
    let dx = 111300.0 * lat.cos() * (pos1.longitude - pos2.longitude);
    let dy = 111300.0 * (pos1.latitude - pos2.latitude);
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests;
