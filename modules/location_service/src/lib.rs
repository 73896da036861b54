// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Location service modul for the geolocator
//!
//! Provides the interface to the platform location service, i.e. the layer
//! that knows which providers exist and delivers their raw samples, and
//! implementations of it.

use common::{
    error::ServiceError,
    position::PositionSample,
    provider::{Criteria, ProviderId},
};
use std::collections::BTreeSet;

pub mod filter;
pub mod gpsd;
pub mod simulated;
mod sink;
mod subscribers;

pub use sink::{SampleSink, UpdateReceiver, update_channel};

/// Number of samples a subscriber should let queue up in its [`SampleSink`].
pub const SINK_CAPACITY: usize = 32;

/// Availability of a provider as reported by a status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderStatus {
    /// The provider delivers samples.
    Available,
    /// The provider is expected to come back shortly.
    TemporarilyUnavailable,
    /// The provider is gone until it is enabled again.
    OutOfService,
}

/// Updates that are pushed by a location service into a [`SampleSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderUpdate {
    /// A new raw sample of the subscribed provider.
    Sample(PositionSample),
    /// A provider was enabled.
    Enabled(ProviderId),
    /// A provider was disabled.
    Disabled(ProviderId),
    /// The availability of a provider changed.
    StatusChanged(ProviderId, ProviderStatus),
}

/// Identifies a subscription of a [`LocationService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Delivery filter of a subscription.
///
/// A value of zero disables the corresponding filter, i.e. every update is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubscriptionRequest {
    /// Minimum time between two delivered samples in milliseconds.
    pub min_interval_ms: u64,
    /// Minimum displacement between two delivered samples in meters.
    pub min_displacement_m: f32,
}

/// Common interface of a platform location service.
///
/// Queries are synchronous and cheap. Samples are pushed asynchronously into
/// the [`SampleSink`] handed over on [`subscribe`](LocationService::subscribe)
/// until the subscription is cancelled.
pub trait LocationService: Send + Sync {
    /// Returns the known providers, only the enabled ones if `enabled_only` is set.
    fn list_providers(&self, enabled_only: bool) -> Result<BTreeSet<ProviderId>, ServiceError>;

    /// Returns the last sample `provider` delivered, if any.
    fn last_known_sample(
        &self,
        provider: &ProviderId,
    ) -> Result<Option<PositionSample>, ServiceError>;

    /// Returns the enabled provider that matches `criteria` best.
    fn best_provider_for(&self, criteria: &Criteria) -> Result<Option<ProviderId>, ServiceError>;

    /// Registers `sink` for the samples of `provider`.
    ///
    /// The sink receives status changes of every provider as well.
    fn subscribe(
        &self,
        provider: &ProviderId,
        request: &SubscriptionRequest,
        sink: SampleSink,
    ) -> Result<SubscriptionId, ServiceError>;

    /// Cancels a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
