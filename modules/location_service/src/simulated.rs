// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{
    LocationService, ProviderStatus, ProviderUpdate, SampleSink, SubscriptionId,
    SubscriptionRequest, subscribers::Subscribers,
};
use common::{
    error::ServiceError,
    position::PositionSample,
    provider::{Criteria, ProviderDescriptor, ProviderId},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tracing::{debug, info};

struct SimulatedProvider {
    descriptor: ProviderDescriptor,
    enabled: bool,
    last_sample: Option<PositionSample>,
}

#[derive(Default)]
struct SimulatedState {
    providers: BTreeMap<ProviderId, SimulatedProvider>,
    subscribers: Subscribers,
    faulty: bool,
}

impl SimulatedState {
    fn check_binding(&self) -> Result<(), ServiceError> {
        if self.faulty {
            return Err(ServiceError::Binding(
                "simulated location service is faulty".to_string(),
            ));
        }
        Ok(())
    }

    fn enabled_descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers
            .values()
            .filter(|provider| provider.enabled)
            .map(|provider| &provider.descriptor)
    }
}

/// An in-memory location service whose providers are controlled by the caller.
///
/// Samples are injected with [`push_sample`](SimulatedLocationService::push_sample)
/// or replayed at a constant frequency with [`replay`](SimulatedLocationService::replay).
/// Every provider starts enabled.
#[derive(Default)]
pub struct SimulatedLocationService {
    state: Mutex<SimulatedState>,
}

impl SimulatedLocationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service that knows the given providers.
    pub fn with_providers(descriptors: impl IntoIterator<Item = ProviderDescriptor>) -> Self {
        let service = Self::new();
        for descriptor in descriptors {
            service.add_provider(descriptor);
        }
        service
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(|state| state.into_inner())
    }

    /// Adds an enabled provider, an existing provider with the same id is replaced.
    pub fn add_provider(&self, descriptor: ProviderDescriptor) {
        self.lock().providers.insert(
            descriptor.id.clone(),
            SimulatedProvider {
                descriptor,
                enabled: true,
                last_sample: None,
            },
        );
    }

    /// Enables or disables a provider and notifies every subscriber.
    ///
    /// Unknown providers are ignored.
    pub fn set_enabled(&self, id: &ProviderId, enabled: bool) {
        let mut state = self.lock();
        let Some(provider) = state.providers.get_mut(id) else {
            return;
        };
        if provider.enabled == enabled {
            return;
        }
        provider.enabled = enabled;
        info!("Provider {} enabled: {}", id, enabled);
        let update = if enabled {
            ProviderUpdate::Enabled(id.clone())
        } else {
            ProviderUpdate::Disabled(id.clone())
        };
        state.subscribers.notify(&update);
    }

    /// Reports a status change of a provider to every subscriber.
    pub fn set_status(&self, id: &ProviderId, status: ProviderStatus) {
        self.lock()
            .subscribers
            .notify(&ProviderUpdate::StatusChanged(id.clone(), status));
    }

    /// Makes every call into the service fail as if the binding to the platform broke.
    pub fn set_faulty(&self, faulty: bool) {
        self.lock().faulty = faulty;
    }

    /// Stores `sample` as last known sample of its provider without delivering it.
    pub fn set_last_known(&self, sample: PositionSample) {
        let mut state = self.lock();
        if let Some(provider) = sample.provider().cloned()
            && let Some(provider) = state.providers.get_mut(&provider)
        {
            provider.last_sample = Some(sample);
        }
    }

    /// Delivers `sample` to the subscribers of its provider.
    ///
    /// Samples of unknown or disabled providers are dropped.
    pub fn push_sample(&self, sample: PositionSample) {
        let mut state = self.lock();
        let Some(id) = sample.provider() else {
            debug!("Dropping sample without provider");
            return;
        };
        let Some(provider) = state.providers.get_mut(id) else {
            debug!("Dropping sample of unknown provider {}", id);
            return;
        };
        if !provider.enabled {
            debug!("Dropping sample of disabled provider {}", provider.descriptor.id);
            return;
        }
        provider.last_sample = Some(sample.clone());
        state.subscribers.deliver_sample(&sample);
    }

    /// Returns the number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Pushes `samples` one after another, one sample per `interval`.
    ///
    /// The replay ends early when the service is dropped.
    pub fn replay(
        self: &Arc<Self>,
        samples: Vec<PositionSample>,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let service = Arc::downgrade(self);
        tokio::spawn(async move {
            replay_task(service, samples, interval).await;
        })
    }
}

async fn replay_task(
    service: Weak<SimulatedLocationService>,
    samples: Vec<PositionSample>,
    interval: Duration,
) {
    let mut timer = tokio::time::interval(interval);
    for sample in samples {
        timer.tick().await;
        let Some(service) = Weak::upgrade(&service) else {
            return;
        };
        service.push_sample(sample);
    }
    debug!("Replay finished");
}

impl LocationService for SimulatedLocationService {
    fn list_providers(&self, enabled_only: bool) -> Result<BTreeSet<ProviderId>, ServiceError> {
        let state = self.lock();
        state.check_binding()?;
        Ok(state
            .providers
            .values()
            .filter(|provider| !enabled_only || provider.enabled)
            .map(|provider| provider.descriptor.id.clone())
            .collect())
    }

    fn last_known_sample(
        &self,
        provider: &ProviderId,
    ) -> Result<Option<PositionSample>, ServiceError> {
        let state = self.lock();
        state.check_binding()?;
        state
            .providers
            .get(provider)
            .map(|provider| provider.last_sample.clone())
            .ok_or_else(|| ServiceError::UnknownProvider(provider.clone()))
    }

    /// Matches the enabled providers against `criteria`.
    ///
    /// If no provider fulfills every requirement, the power requirement is
    /// dropped first and the accuracy requirement second. Among the matching
    /// providers the one with the lowest power consumption wins.
    fn best_provider_for(&self, criteria: &Criteria) -> Result<Option<ProviderId>, ServiceError> {
        let state = self.lock();
        state.check_binding()?;
        let rules: [&dyn Fn(&ProviderDescriptor) -> bool; 3] = [
            &|descriptor: &ProviderDescriptor| descriptor.satisfies(criteria),
            &|descriptor: &ProviderDescriptor| descriptor.satisfies_accuracy(criteria),
            &|_: &ProviderDescriptor| true,
        ];
        Ok(rules.iter().find_map(|rule| {
            state
                .enabled_descriptors()
                .filter(|descriptor| rule(descriptor))
                .min_by_key(|descriptor| descriptor.power)
                .map(|descriptor| descriptor.id.clone())
        }))
    }

    fn subscribe(
        &self,
        provider: &ProviderId,
        request: &SubscriptionRequest,
        sink: SampleSink,
    ) -> Result<SubscriptionId, ServiceError> {
        let mut state = self.lock();
        state.check_binding()?;
        if !state.providers.contains_key(provider) {
            return Err(ServiceError::UnknownProvider(provider.clone()));
        }
        Ok(state.subscribers.add(provider, request, sink))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(id);
    }
}
