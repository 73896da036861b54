// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a location provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Identifier of the satellite based provider.
    pub const GPS: &'static str = "gps";
    /// Identifier of the cell/wifi based provider.
    pub const NETWORK: &'static str = "network";
    /// Identifier of the provider that only piggybacks on fixes requested by others.
    pub const PASSIVE: &'static str = "passive";

    pub fn new(id: impl Into<String>) -> Self {
        ProviderId(id.into())
    }

    pub fn gps() -> Self {
        ProviderId::new(Self::GPS)
    }

    pub fn network() -> Self {
        ProviderId::new(Self::NETWORK)
    }

    pub fn passive() -> Self {
        ProviderId::new(Self::PASSIVE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        ProviderId::new(id)
    }
}

impl PartialEq<str> for ProviderId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProviderId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Positional precision class of a provider.
///
/// `Fine` providers satisfy requests for `Coarse` precision as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccuracyClass {
    Coarse,
    Fine,
}

/// Power consumption class of a provider, ordered from cheapest to most expensive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerClass {
    Low,
    Medium,
    High,
}

/// Horizontal accuracy level that is requested from a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HorizontalAccuracy {
    Low,
    Medium,
    High,
}

/// Capability attributes of a provider.
///
/// Only used while a provider is selected, the session keeps the chosen
/// [`ProviderId`] alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub accuracy: AccuracyClass,
    pub power: PowerClass,
}

impl ProviderDescriptor {
    pub fn new(id: ProviderId, accuracy: AccuracyClass, power: PowerClass) -> Self {
        ProviderDescriptor {
            id,
            accuracy,
            power,
        }
    }

    /// Returns `true` if the provider fulfills every requirement of `criteria`.
    pub fn satisfies(&self, criteria: &Criteria) -> bool {
        self.satisfies_accuracy(criteria) && self.satisfies_power(criteria)
    }

    /// Returns `true` if the precision of the provider is at least the requested one.
    pub fn satisfies_accuracy(&self, criteria: &Criteria) -> bool {
        criteria.accuracy.is_none_or(|accuracy| self.accuracy >= accuracy)
    }

    /// Returns `true` if the provider doesn't consume more power than allowed.
    pub fn satisfies_power(&self, criteria: &Criteria) -> bool {
        criteria.power.is_none_or(|power| self.power <= power)
    }
}

/// Desired capabilities of a provider. `None` means no requirement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub accuracy: Option<AccuracyClass>,
    pub horizontal_accuracy: Option<HorizontalAccuracy>,
    pub power: Option<PowerClass>,
}
