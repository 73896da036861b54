// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{
    ProviderUpdate, SampleSink, SubscriptionId, SubscriptionRequest, filter::UpdateFilter,
};
use common::{position::PositionSample, provider::ProviderId};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error};

struct Subscriber {
    id: SubscriptionId,
    provider: ProviderId,
    filter: UpdateFilter,
    sink: SampleSink,
}

/// Registered sinks of a location service.
///
/// Updates are pushed without waiting. A sink whose sample queue is full loses
/// the sample, status updates are always queued.
/// Sinks whose receiver was dropped are removed on the next delivery.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<Subscriber>,
}

impl Subscribers {
    pub fn add(
        &mut self,
        provider: &ProviderId,
        request: &SubscriptionRequest,
        sink: SampleSink,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push(Subscriber {
            id,
            provider: provider.clone(),
            filter: UpdateFilter::new(*request),
            sink,
        });
        debug!("Added subscription {:?} for provider {}", id, provider);
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) {
        self.entries.retain(|subscriber| subscriber.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delivers `sample` to the subscribers of its provider whose filter lets it pass.
    pub fn deliver_sample(&mut self, sample: &PositionSample) {
        self.entries.retain_mut(|subscriber| {
            if sample.provider() != Some(&subscriber.provider) || !subscriber.filter.pass(sample) {
                return true;
            }
            push(subscriber, ProviderUpdate::Sample(sample.clone()))
        });
    }

    /// Delivers a status update to every subscriber.
    pub fn notify(&mut self, update: &ProviderUpdate) {
        self.entries
            .retain_mut(|subscriber| push(subscriber, update.clone()));
    }
}

/// Returns `false` if the subscriber is gone.
fn push(subscriber: &Subscriber, update: ProviderUpdate) -> bool {
    match subscriber.sink.try_send(update) {
        Ok(()) => true,
        Err(TrySendError::Full(update)) => {
            error!(
                "Samples of subscription {:?} lag behind, dropping {:?}",
                subscriber.id, update
            );
            true
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Sink of subscription {:?} closed", subscriber.id);
            false
        }
    }
}
