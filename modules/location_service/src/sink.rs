// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::ProviderUpdate;
use tokio::sync::mpsc::{
    self,
    error::{TryRecvError, TrySendError},
};

/// Creates a connected [`SampleSink`] and [`UpdateReceiver`].
///
/// At most `capacity` samples are queued. Provider state changes are not bounded.
pub fn update_channel(capacity: usize) -> (SampleSink, UpdateReceiver) {
    let (samples, sample_receiver) = mpsc::channel(capacity);
    let (control, control_receiver) = mpsc::unbounded_channel();
    (
        SampleSink { samples, control },
        UpdateReceiver {
            samples: sample_receiver,
            control: control_receiver,
        },
    )
}

/// Channel through which a subscriber receives its updates.
///
/// Samples are lost when the subscriber lags behind, provider state changes always arrive.
#[derive(Clone, Debug)]
pub struct SampleSink {
    samples: mpsc::Sender<ProviderUpdate>,
    control: mpsc::UnboundedSender<ProviderUpdate>,
}

impl SampleSink {
    /// Queues `update` without waiting.
    ///
    /// Only a [`ProviderUpdate::Sample`] can fail with [`TrySendError::Full`].
    pub fn try_send(&self, update: ProviderUpdate) -> Result<(), TrySendError<ProviderUpdate>> {
        match update {
            ProviderUpdate::Sample(_) => self.samples.try_send(update),
            _ => self
                .control
                .send(update)
                .map_err(|e| TrySendError::Closed(e.0)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.samples.is_closed() || self.control.is_closed()
    }
}

/// Receiving half of an [`update_channel`].
///
/// Pending provider state changes are handed out before pending samples.
#[derive(Debug)]
pub struct UpdateReceiver {
    samples: mpsc::Receiver<ProviderUpdate>,
    control: mpsc::UnboundedReceiver<ProviderUpdate>,
}

impl UpdateReceiver {
    /// Waits for the next update. Returns `None` once the sink is dropped and every update was received.
    pub async fn recv(&mut self) -> Option<ProviderUpdate> {
        tokio::select! {
            biased;
            Some(update) = self.control.recv() => Some(update),
            Some(update) = self.samples.recv() => Some(update),
            else => None,
        }
    }

    pub fn try_recv(&mut self) -> Result<ProviderUpdate, TryRecvError> {
        match self.control.try_recv() {
            Ok(update) => Ok(update),
            Err(_) => self.samples.try_recv(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{provider::ProviderId, test_helper::samples::sample};

    #[test]
    fn full_queue_only_rejects_samples() {
        let (sink, mut receiver) = update_channel(1);
        sink.try_send(ProviderUpdate::Sample(sample(1000, 5.0, "gps")))
            .unwrap();

        assert!(matches!(
            sink.try_send(ProviderUpdate::Sample(sample(2000, 5.0, "gps"))),
            Err(TrySendError::Full(_))
        ));
        sink.try_send(ProviderUpdate::Disabled(ProviderId::gps()))
            .unwrap();

        assert_eq!(
            receiver.try_recv(),
            Ok(ProviderUpdate::Disabled(ProviderId::gps()))
        );
        assert_eq!(
            receiver.try_recv(),
            Ok(ProviderUpdate::Sample(sample(1000, 5.0, "gps")))
        );
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn dropped_receiver_closes_sink() {
        let (sink, receiver) = update_channel(1);
        drop(receiver);

        assert!(sink.is_closed());
        assert!(matches!(
            sink.try_send(ProviderUpdate::Enabled(ProviderId::gps())),
            Err(TrySendError::Closed(_))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn recv_ends_after_sink_dropped() {
        let (sink, mut receiver) = update_channel(1);
        sink.try_send(ProviderUpdate::Sample(sample(1000, 5.0, "gps")))
            .unwrap();
        drop(sink);

        assert_eq!(
            receiver.recv().await,
            Some(ProviderUpdate::Sample(sample(1000, 5.0, "gps")))
        );
        assert_eq!(receiver.recv().await, None);
    }
}
