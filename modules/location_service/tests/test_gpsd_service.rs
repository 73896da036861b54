// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{error::ServiceError, provider::ProviderId};
use location_service::{
    LocationService, ProviderStatus, ProviderUpdate, SINK_CAPACITY, SubscriptionRequest,
    UpdateReceiver, gpsd::GpsdLocationService, update_channel,
};
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time::timeout,
};

const TIMEOUT: Duration = Duration::from_millis(100);

const TPV_MSG: &str = " \
{ \
    \"class\": \"TPV\", \
    \"time\": \"2005-06-08T10:34:48.283Z\", \
    \"lat\": 52.0270889, \
    \"lon\": 11.2803483, \
    \"epx\": 8.0, \
    \"epy\": 3.5, \
    \"speed\": 22.0, \
    \"mode\": 3 \
}\n\r";

const NO_FIX_MSG: &str = "{\"class\":\"TPV\",\"mode\":1}\n";

async fn test_setup() -> (GpsdLocationService, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind gpsd test server");
    let address = listener
        .local_addr()
        .expect("No local address of gpsd test server");
    let service = GpsdLocationService::connect(&address.to_string())
        .await
        .expect("Failed to connect to gpsd test server");
    let (client, _) = timeout(TIMEOUT, listener.accept())
        .await
        .expect("No client connected in time")
        .expect("Client connection failed");
    (service, client)
}

async fn next_update(receiver: &mut UpdateReceiver) -> ProviderUpdate {
    timeout(TIMEOUT, receiver.recv())
        .await
        .expect("No update received in time")
        .expect("Sink closed")
}

#[test_log::test(tokio::test)]
async fn enable_gpsd_watch_mode() {
    let (_service, mut client) = test_setup().await;
    let mut buf = vec![0; gpsd_proto::ENABLE_WATCH_CMD.len()];
    timeout(TIMEOUT, client.read_exact(&mut buf))
        .await
        .expect("Watch command not received in time")
        .expect("Failed to read watch command");
    assert_eq!(
        std::str::from_utf8(&buf).expect("Watch command is not a valid string"),
        gpsd_proto::ENABLE_WATCH_CMD
    );
}

#[test_log::test(tokio::test)]
async fn deliver_tpv_reports_as_gps_samples() {
    let (service, mut client) = test_setup().await;
    let (sink, mut receiver) = update_channel(SINK_CAPACITY);
    service
        .subscribe(&ProviderId::gps(), &SubscriptionRequest::default(), sink)
        .expect("Subscription failed");

    client
        .write_all(NO_FIX_MSG.as_bytes())
        .await
        .expect("Failed to send TPV msg");
    client
        .write_all(TPV_MSG.as_bytes())
        .await
        .expect("Failed to send TPV msg");

    let ProviderUpdate::Sample(sample) = next_update(&mut receiver).await else {
        panic!("Expected a sample update");
    };
    assert_eq!(sample.timestamp(), 1118226888283);
    assert_eq!(sample.latitude(), 52.0270889);
    assert_eq!(sample.longitude(), 11.2803483);
    assert_eq!(sample.accuracy(), 8.0);
    assert_eq!(sample.provider(), Some(&ProviderId::gps()));
    assert_eq!(
        service.last_known_sample(&ProviderId::gps()).unwrap(),
        Some(sample)
    );
}

#[test_log::test(tokio::test)]
async fn report_provider_loss_when_daemon_disconnects() {
    let (service, client) = test_setup().await;
    let (sink, mut receiver) = update_channel(SINK_CAPACITY);
    service
        .subscribe(&ProviderId::gps(), &SubscriptionRequest::default(), sink)
        .expect("Subscription failed");
    assert_eq!(
        service.list_providers(true).unwrap().into_iter().collect::<Vec<_>>(),
        vec![ProviderId::gps()]
    );

    drop(client);

    assert_eq!(
        next_update(&mut receiver).await,
        ProviderUpdate::StatusChanged(ProviderId::gps(), ProviderStatus::OutOfService)
    );
    assert_eq!(
        next_update(&mut receiver).await,
        ProviderUpdate::Disabled(ProviderId::gps())
    );
    assert!(!service.is_connected());
    assert!(service.list_providers(true).unwrap().is_empty());
    assert_eq!(service.best_provider_for(&Default::default()).unwrap(), None);
    let (sink, _receiver) = update_channel(SINK_CAPACITY);
    assert_eq!(
        service.subscribe(&ProviderId::gps(), &SubscriptionRequest::default(), sink),
        Err(ServiceError::Unavailable)
    );
}

#[test_log::test(tokio::test)]
async fn only_the_gps_provider_is_known() {
    let (service, _client) = test_setup().await;
    let (sink, _receiver) = update_channel(SINK_CAPACITY);
    assert_eq!(
        service.subscribe(&ProviderId::network(), &SubscriptionRequest::default(), sink),
        Err(ServiceError::UnknownProvider(ProviderId::network()))
    );
    assert_eq!(
        service.best_provider_for(&Default::default()).unwrap(),
        Some(ProviderId::gps())
    );
}

#[test_log::test(tokio::test)]
async fn reject_invalid_address() {
    assert!(matches!(
        GpsdLocationService::connect("not an address").await,
        Err(ServiceError::Binding(_))
    ));
}
