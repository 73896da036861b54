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
    provider::{Criteria, ProviderId},
};
use futures::StreamExt;
use gpsd_proto::{Mode, Tpv};
use std::{
    collections::BTreeSet,
    net::SocketAddr,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::{io::AsyncWriteExt, net::TcpStream, task::JoinHandle};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info};

/// Accuracy radius in meters that is assumed when gpsd reports no error estimate.
pub const DEFAULT_ACCURACY: f32 = 50.0;

#[derive(Default)]
struct GpsdState {
    connected: bool,
    last_sample: Option<PositionSample>,
    subscribers: Subscribers,
}

fn lock(state: &Mutex<GpsdState>) -> MutexGuard<'_, GpsdState> {
    state.lock().unwrap_or_else(|state| state.into_inner())
}

/// GPSD daemon based location service.
///
/// Exposes a single provider, [`ProviderId::GPS`], that is enabled as long as
/// the connection to the daemon is alive.
pub struct GpsdLocationService {
    state: Arc<Mutex<GpsdState>>,
    reader: JoinHandle<()>,
}

impl GpsdLocationService {
    /// Connects to the GPSD daemon and starts reading its reports.
    ///
    /// # Arguments
    ///
    /// * `address` - The address of the GPSD daemon, e.g. `127.0.0.1:2947`.
    ///
    /// # Returns
    ///
    /// * `Ok(GpsdLocationService)` - If the connection is established.
    /// * `Err(ServiceError::Binding)` - If the address is invalid or the connection fails.
    pub async fn connect(address: &str) -> Result<Self, ServiceError> {
        let address: SocketAddr = address
            .parse()
            .map_err(|e| ServiceError::Binding(format!("invalid gpsd address {address}: {e}")))?;
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| ServiceError::Binding(format!("gpsd at {address}: {e}")))?;
        info!("Connected to gpsd at {}", address);
        let state = Arc::new(Mutex::new(GpsdState {
            connected: true,
            ..Default::default()
        }));
        let reader = tokio::spawn(gpsd_reader(stream, Arc::clone(&state)));
        Ok(GpsdLocationService { state, reader })
    }

    /// Returns `true` as long as the daemon connection is alive.
    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }
}

impl Drop for GpsdLocationService {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Converts a TPV report into a sample of the [`ProviderId::GPS`] provider.
///
/// Reports without fix, position or time are skipped. The accuracy radius is
/// the larger of the longitude and latitude error estimates.
pub fn convert_tpv(tpv: &Tpv) -> Option<PositionSample> {
    if matches!(tpv.mode, Mode::NoFix) {
        return None;
    }
    let lat = tpv.lat?;
    let lon = tpv.lon?;
    let time = chrono::DateTime::<chrono::Utc>::from_str(tpv.time.as_deref()?).ok()?;
    let accuracy = match (tpv.epx, tpv.epy) {
        (Some(epx), Some(epy)) => epx.max(epy),
        (Some(error), None) | (None, Some(error)) => error,
        (None, None) => DEFAULT_ACCURACY,
    };
    Some(PositionSample::new(
        time.timestamp_millis(),
        lat,
        lon,
        accuracy,
        Some(ProviderId::gps()),
    ))
}

async fn gpsd_reader(mut stream: TcpStream, state: Arc<Mutex<GpsdState>>) {
    match stream
        .write_all(gpsd_proto::ENABLE_WATCH_CMD.as_bytes())
        .await
    {
        Ok(()) => read_reports(stream, &state).await,
        Err(e) => error!("Failed to enable gpsd watch mode: {e}"),
    }
    connection_lost(&state);
}

async fn read_reports(stream: TcpStream, state: &Mutex<GpsdState>) {
    let mut framed = Framed::new(stream, LinesCodec::new());
    while let Some(result) = framed.next().await {
        match result {
            Ok(ref line) => {
                let Ok(tpv) = serde_json::from_str::<Tpv>(line) else {
                    continue;
                };
                let Some(sample) = convert_tpv(&tpv) else {
                    debug!("Skipping TPV report without fix");
                    continue;
                };
                let mut state = lock(state);
                state.last_sample = Some(sample.clone());
                state.subscribers.deliver_sample(&sample);
            }
            Err(e) => error!("GPSD receive error {e:?}"),
        }
    }
}

fn connection_lost(state: &Mutex<GpsdState>) {
    info!("Connection to gpsd lost");
    let mut state = lock(state);
    state.connected = false;
    let gps = ProviderId::gps();
    state.subscribers.notify(&ProviderUpdate::StatusChanged(
        gps.clone(),
        ProviderStatus::OutOfService,
    ));
    state.subscribers.notify(&ProviderUpdate::Disabled(gps));
}

impl LocationService for GpsdLocationService {
    fn list_providers(&self, enabled_only: bool) -> Result<BTreeSet<ProviderId>, ServiceError> {
        let state = lock(&self.state);
        if enabled_only && !state.connected {
            return Ok(BTreeSet::new());
        }
        Ok(BTreeSet::from([ProviderId::gps()]))
    }

    fn last_known_sample(
        &self,
        provider: &ProviderId,
    ) -> Result<Option<PositionSample>, ServiceError> {
        if provider != ProviderId::GPS {
            return Err(ServiceError::UnknownProvider(provider.clone()));
        }
        Ok(lock(&self.state).last_sample.clone())
    }

    /// The satellite provider is the only candidate, it matches any criteria while connected.
    fn best_provider_for(&self, _criteria: &Criteria) -> Result<Option<ProviderId>, ServiceError> {
        Ok(lock(&self.state).connected.then(ProviderId::gps))
    }

    fn subscribe(
        &self,
        provider: &ProviderId,
        request: &SubscriptionRequest,
        sink: SampleSink,
    ) -> Result<SubscriptionId, ServiceError> {
        if provider != ProviderId::GPS {
            return Err(ServiceError::UnknownProvider(provider.clone()));
        }
        let mut state = lock(&self.state);
        if !state.connected {
            return Err(ServiceError::Unavailable);
        }
        Ok(state.subscribers.add(provider, request, sink))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.state).subscribers.remove(id);
    }
}
