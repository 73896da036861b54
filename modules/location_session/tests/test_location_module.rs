// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{
    error::LocationError,
    options::{AccuracyProfile, LocationOptions},
    test_helper::samples::{gps_descriptor, network_descriptor, sample},
};
use location_service::simulated::SimulatedLocationService;
use location_session::LocationModule;
use module_core::{
    Event, EventBus, EventKind, EventKindType, Module, payload_ref,
    test_helper::{stop_module, wait_for_event},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast::Receiver;

const TIMEOUT: Duration = Duration::from_millis(100);

fn create_module(
    eb: &EventBus,
    service: &Arc<SimulatedLocationService>,
) -> tokio::task::JoinHandle<Result<(), ()>> {
    let mut module = LocationModule::new(eb.context(), Arc::clone(service));
    tokio::spawn(async move { module.run().await })
}

fn service() -> Arc<SimulatedLocationService> {
    Arc::new(SimulatedLocationService::with_providers([
        gps_descriptor(),
        network_descriptor(),
    ]))
}

/// Requests the last known position and returns the response.
///
/// Requests are handled in order, so all earlier requests are processed once this returns.
async fn last_known_position(eb: &EventBus, rx: &mut Receiver<Event>) -> Event {
    eb.publish(&Event {
        kind: EventKind::LastKnownPositionRequestEvent,
    });
    wait_for_event(
        rx,
        TIMEOUT,
        EventKindType::LastKnownPositionResponseEvent,
    )
    .await
}

fn start_request(profile: AccuracyProfile) -> Event {
    Event {
        kind: EventKind::StartTrackingRequestEvent(LocationOptions::new(profile)),
    }
}

#[test_log::test(tokio::test)]
async fn publish_positions_after_start_request() {
    let eb = EventBus::default();
    let service = service();
    let mut rx = eb.subscribe();
    let mut module = create_module(&eb, &service);

    eb.publish(&start_request(AccuracyProfile::Best));
    last_known_position(&eb, &mut rx).await;
    service.push_sample(sample(1000, 20.0, "network"));

    let event = wait_for_event(&mut rx, TIMEOUT, EventKindType::PositionChangedEvent).await;
    assert_eq!(
        payload_ref!(event.kind, EventKind::PositionChangedEvent).map(|position| position.as_ref()),
        Some(&sample(1000, 20.0, "network"))
    );
    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn stop_request_cancels_subscription() {
    let eb = EventBus::default();
    let service = service();
    let mut rx = eb.subscribe();
    let mut module = create_module(&eb, &service);

    eb.publish(&start_request(AccuracyProfile::Medium));
    last_known_position(&eb, &mut rx).await;
    assert_eq!(service.subscription_count(), 1);

    eb.publish(&Event {
        kind: EventKind::StopTrackingRequestEvent,
    });
    last_known_position(&eb, &mut rx).await;
    assert_eq!(service.subscription_count(), 0);
    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn answer_last_known_position_request() {
    let eb = EventBus::default();
    let service = service();
    let mut rx = eb.subscribe();
    let mut module = create_module(&eb, &service);

    let event = last_known_position(&eb, &mut rx).await;
    assert_eq!(
        payload_ref!(event.kind, EventKind::LastKnownPositionResponseEvent),
        Some(&None)
    );

    service.set_last_known(sample(1000, 10.0, "gps"));
    service.set_last_known(sample(1000, 80.0, "network"));
    let event = last_known_position(&eb, &mut rx).await;
    let position = payload_ref!(event.kind, EventKind::LastKnownPositionResponseEvent)
        .and_then(|position| position.as_deref());
    assert_eq!(position, Some(&sample(1000, 10.0, "gps")));
    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn publish_error_when_start_fails() {
    let eb = EventBus::default();
    let service = service();
    service.set_faulty(true);
    let mut rx = eb.subscribe();
    let mut module = create_module(&eb, &service);

    eb.publish(&start_request(AccuracyProfile::Best));

    let event = wait_for_event(&mut rx, TIMEOUT, EventKindType::LocationErrorEvent).await;
    assert_eq!(
        payload_ref!(event.kind, EventKind::LocationErrorEvent),
        Some(&LocationError::ServiceDisabled)
    );
    stop_module(&eb, &mut module).await;
}

#[test_log::test(tokio::test)]
async fn quit_stops_tracking() {
    let eb = EventBus::default();
    let service = service();
    let mut rx = eb.subscribe();
    let mut module = create_module(&eb, &service);

    eb.publish(&start_request(AccuracyProfile::Low));
    last_known_position(&eb, &mut rx).await;
    assert_eq!(service.subscription_count(), 1);

    stop_module(&eb, &mut module).await;
    assert_eq!(service.subscription_count(), 0);
}
