// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Location session of the geolocator
//!
//! A [`LocationSession`] selects a provider for a requested accuracy profile,
//! subscribes to it and forwards every sample that passes the arbitration as
//! [`EventKind::PositionChangedEvent`]. Errors are reported as
//! [`EventKind::LocationErrorEvent`].

use algorithm::{
    ArbiterConfig, best_sample, criteria_for, desired_accuracy, is_acceptable, is_better_with,
    prefer_provider,
};
use common::{
    error::LocationError,
    options::{AccuracyProfile, LocationOptions},
    position::PositionSample,
    provider::ProviderId,
};
use location_service::{
    LocationService, ProviderStatus, ProviderUpdate, SINK_CAPACITY, SubscriptionId,
    SubscriptionRequest, UpdateReceiver, update_channel,
};
use module_core::{Event, EventKind, PositionSamplePtr};
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, Weak},
};
use tokio::{
    runtime::Handle,
    sync::broadcast,
    task::JoinHandle,
};
use tracing::{debug, error, info};

mod module;

pub use module::LocationModule;

struct Subscription {
    id: SubscriptionId,
    forwarder: JoinHandle<()>,
}

#[derive(Default)]
struct SessionState {
    options: Option<LocationOptions>,
    desired_accuracy: f32,
    provider: Option<ProviderId>,
    current_best: Option<PositionSamplePtr>,
    active: bool,
    generation: u64,
    subscription: Option<Subscription>,
}

struct SessionInner<S: LocationService> {
    service: Arc<S>,
    state: Mutex<SessionState>,
    sender: broadcast::Sender<Event>,
    config: ArbiterConfig,
}

impl<S: LocationService> Drop for SessionInner<S> {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|state| state.into_inner());
        if let Some(subscription) = state.subscription.take() {
            subscription.forwarder.abort();
            self.service.unsubscribe(subscription.id);
        }
    }
}

/// Tracks the position of the device with one provider at a time.
///
/// All operations serialize on one lock. Accepted samples are published while
/// that lock is held, so no update reaches the consumer after
/// [`stop_tracking`](LocationSession::stop_tracking) returned.
///
/// Cloning a session yields another handle to the same session.
pub struct LocationSession<S: LocationService> {
    inner: Arc<SessionInner<S>>,
}

impl<S: LocationService> Clone for LocationSession<S> {
    fn clone(&self) -> Self {
        LocationSession {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LocationService + 'static> LocationSession<S> {
    /// Creates an inactive session that publishes its events with `sender`.
    pub fn new(service: Arc<S>, sender: broadcast::Sender<Event>) -> Self {
        Self::with_config(service, sender, ArbiterConfig::default())
    }

    /// Creates an inactive session that arbitrates samples with `config`.
    pub fn with_config(
        service: Arc<S>,
        sender: broadcast::Sender<Event>,
        config: ArbiterConfig,
    ) -> Self {
        LocationSession {
            inner: Arc::new(SessionInner {
                service,
                state: Mutex::new(SessionState::default()),
                sender,
                config,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|state| state.into_inner())
    }

    fn publish(&self, kind: EventKind) {
        if self.inner.sender.send(Event { kind }).is_err() {
            debug!("No consumer subscribed, event dropped");
        }
    }

    /// Returns `true` if at least one provider is enabled.
    ///
    /// A failing location service counts as disabled.
    pub fn check_service_enabled(&self) -> bool {
        match self.inner.service.list_providers(true) {
            Ok(providers) => !providers.is_empty(),
            Err(e) => {
                error!("Failed to query location providers: {e}");
                false
            }
        }
    }

    /// Returns the best sample cached by any enabled provider.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(sample))` - The cached sample that won the arbitration.
    /// * `Ok(None)` - No enabled provider has a cached sample.
    /// * `Err(LocationError::ServiceDisabled)` - The providers could not be listed.
    ///
    /// A provider whose cached sample cannot be queried is skipped.
    pub fn get_last_known_position(&self) -> Result<Option<PositionSample>, LocationError> {
        let service = &self.inner.service;
        let providers = service
            .list_providers(true)
            .inspect_err(|e| error!("Failed to query location providers: {e}"))?;
        let samples = providers.iter().filter_map(|provider| {
            service
                .last_known_sample(provider)
                .inspect_err(|e| error!("Failed to query last sample of {provider}: {e}"))
                .ok()
                .flatten()
        });
        Ok(best_sample(&self.inner.config, samples))
    }

    /// Starts tracking with `profile`, every provider update is delivered.
    pub fn start_tracking(&self, profile: AccuracyProfile) -> Result<(), LocationError> {
        self.start_tracking_with(LocationOptions::new(profile))
    }

    /// Starts tracking with `options`.
    ///
    /// An active subscription is cancelled first and the current best sample
    /// is cleared. Samples arrive asynchronously once this returned `Ok`.
    /// Failures are returned and published as [`EventKind::LocationErrorEvent`].
    ///
    /// # Errors
    ///
    /// * `LocationError::InvalidProfile` - `options` are malformed, nothing was changed.
    /// * `LocationError::ServiceDisabled` - No provider could be selected or subscribed.
    pub fn start_tracking_with(&self, options: LocationOptions) -> Result<(), LocationError> {
        let result = self.try_start_tracking(options);
        if let Err(e) = &result {
            error!("Failed to start tracking: {e}");
            self.publish(EventKind::LocationErrorEvent(e.clone()));
        }
        result
    }

    fn try_start_tracking(&self, options: LocationOptions) -> Result<(), LocationError> {
        options.validate()?;
        let available = self.inner.service.list_providers(true)?;
        if available.is_empty() {
            return Err(LocationError::ServiceDisabled);
        }
        let provider = self
            .select_provider(options.accuracy, &available)
            .ok_or(LocationError::ServiceDisabled)?;
        let runtime = Handle::try_current().map_err(|e| {
            error!("No runtime to forward location updates: {e}");
            LocationError::ServiceDisabled
        })?;

        let mut state = self.lock();
        self.cancel_subscription(&mut state);

        let (sink, updates) = update_channel(SINK_CAPACITY);
        let request = SubscriptionRequest {
            min_interval_ms: options.time_interval_ms,
            min_displacement_m: options.distance_filter_m,
        };
        let id = self.inner.service.subscribe(&provider, &request, sink)?;

        state.generation += 1;
        state.options = Some(options);
        state.desired_accuracy = desired_accuracy(Some(options.accuracy));
        state.current_best = None;
        state.active = true;
        let forwarder = runtime.spawn(forward_updates(
            Arc::downgrade(&self.inner),
            state.generation,
            updates,
        ));
        state.subscription = Some(Subscription { id, forwarder });
        info!(
            "Tracking started with provider {} and profile {}",
            provider, options.accuracy
        );
        state.provider = Some(provider);
        Ok(())
    }

    /// Stops tracking. Calling it on an inactive session does nothing.
    pub fn stop_tracking(&self) {
        let mut state = self.lock();
        if state.active {
            info!("Tracking stopped");
        }
        self.cancel_subscription(&mut state);
    }

    fn cancel_subscription(&self, state: &mut SessionState) {
        state.active = false;
        state.provider = None;
        state.generation += 1;
        if let Some(subscription) = state.subscription.take() {
            subscription.forwarder.abort();
            self.inner.service.unsubscribe(subscription.id);
        }
    }

    /// Forwards `sample` if it is accurate enough and better than the current best.
    ///
    /// Samples that fail either check are dropped, as is every sample while
    /// the session is inactive.
    pub fn on_sample_received(&self, sample: PositionSample) {
        let mut state = self.lock();
        self.accept_sample(&mut state, sample);
    }

    fn accept_sample(&self, state: &mut SessionState, sample: PositionSample) {
        if !state.active {
            debug!("Session inactive, dropping sample");
            return;
        }
        if !is_acceptable(&sample, state.desired_accuracy) {
            debug!(
                "Dropping sample with accuracy {} above {}",
                sample.accuracy(),
                state.desired_accuracy
            );
            return;
        }
        if !is_better_with(&self.inner.config, &sample, state.current_best.as_deref()) {
            debug!("Dropping sample that is not better than the current best");
            return;
        }
        let sample = PositionSamplePtr::new(sample);
        state.current_best = Some(sample.clone());
        self.publish(EventKind::PositionChangedEvent(sample));
    }

    /// Ends tracking with [`LocationError::ServiceDisabled`] if `provider` is the tracked one.
    pub fn on_provider_lost(&self, provider: &ProviderId) {
        let mut state = self.lock();
        self.provider_lost(&mut state, provider);
    }

    fn provider_lost(&self, state: &mut SessionState, provider: &ProviderId) {
        if state.provider.as_ref() != Some(provider) {
            debug!("Ignoring loss of untracked provider {}", provider);
            return;
        }
        info!("Tracked provider {} lost", provider);
        self.cancel_subscription(state);
        self.publish(EventKind::LocationErrorEvent(LocationError::ServiceDisabled));
    }

    /// Tracking is not resumed when a provider comes back, it has to be started again.
    pub fn on_provider_restored(&self, provider: &ProviderId) {
        debug!("Provider {} restored", provider);
    }

    fn handle_update(&self, generation: u64, update: ProviderUpdate) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!("Discarding update of superseded subscription");
            return;
        }
        match update {
            ProviderUpdate::Sample(sample) => self.accept_sample(&mut state, sample),
            ProviderUpdate::Enabled(provider) => self.on_provider_restored(&provider),
            ProviderUpdate::Disabled(provider) => self.provider_lost(&mut state, &provider),
            ProviderUpdate::StatusChanged(provider, status) => match status {
                ProviderStatus::Available => self.on_provider_restored(&provider),
                ProviderStatus::OutOfService => self.provider_lost(&mut state, &provider),
                ProviderStatus::TemporarilyUnavailable => {
                    debug!("Provider {} temporarily unavailable", provider)
                }
            },
        }
    }

    /// Selects the provider to track for `profile`.
    ///
    /// The location service is asked for the provider that matches the
    /// criteria of `profile`, then the fixed preference of
    /// [`prefer_provider`] is applied against `available`. A failing
    /// location service yields no capability match.
    pub fn select_provider(
        &self,
        profile: AccuracyProfile,
        available: &BTreeSet<ProviderId>,
    ) -> Option<ProviderId> {
        let criteria = criteria_for(profile);
        let capability_match = self
            .inner
            .service
            .best_provider_for(&criteria)
            .unwrap_or_else(|e| {
                error!("Failed to match provider for {profile}: {e}");
                None
            });
        let provider = prefer_provider(available, capability_match);
        debug!("Selected provider {:?} for profile {}", provider, profile);
        provider
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// The provider of the active subscription.
    pub fn current_provider(&self) -> Option<ProviderId> {
        self.lock().provider.clone()
    }

    /// The last forwarded sample, kept after tracking stopped until the next start.
    pub fn current_best(&self) -> Option<PositionSamplePtr> {
        self.lock().current_best.clone()
    }

    /// The options of the last successful start.
    pub fn options(&self) -> Option<LocationOptions> {
        self.lock().options
    }
}

async fn forward_updates<S: LocationService + 'static>(
    session: Weak<SessionInner<S>>,
    generation: u64,
    mut updates: UpdateReceiver,
) {
    while let Some(update) = updates.recv().await {
        let Some(inner) = Weak::upgrade(&session) else {
            return;
        };
        LocationSession { inner }.handle_update(generation, update);
    }
    debug!("Updates of subscription {} ended", generation);
}
