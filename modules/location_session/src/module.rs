// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::LocationSession;
use async_trait::async_trait;
use location_service::LocationService;
use module_core::{EventKind, Module, ModuleCtx, PositionSamplePtr};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error};

/// The `LocationModule` drives a [`LocationSession`] from the event bus.
///
/// It starts and stops tracking on request and answers last known position
/// requests. Positions and errors of the session are published on the same bus.
pub struct LocationModule<S: LocationService> {
    ctx: ModuleCtx,
    session: LocationSession<S>,
}

impl<S: LocationService + 'static> LocationModule<S> {
    pub fn new(ctx: ModuleCtx, service: Arc<S>) -> Self {
        let session = LocationSession::new(service, ctx.sender.clone());
        LocationModule { ctx, session }
    }

    /// Creates a module around an existing session, e.g. one with a custom arbiter configuration.
    pub fn with_session(ctx: ModuleCtx, session: LocationSession<S>) -> Self {
        LocationModule { ctx, session }
    }

    pub fn session(&self) -> &LocationSession<S> {
        &self.session
    }

    fn on_last_known_position_request(&self) {
        let position = match self.session.get_last_known_position() {
            Ok(position) => position.map(PositionSamplePtr::new),
            Err(e) => {
                let _ = self.ctx.publish_event(EventKind::LocationErrorEvent(e));
                None
            }
        };
        let _ = self
            .ctx
            .publish_event(EventKind::LastKnownPositionResponseEvent(position));
    }
}

#[async_trait]
impl<S: LocationService + 'static> Module for LocationModule<S> {
    async fn run(&mut self) -> Result<(), ()> {
        let mut run = true;
        while run {
            tokio::select! {
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => match event.kind {
                            EventKind::QuitEvent => {
                                self.session.stop_tracking();
                                run = false;
                            }
                            EventKind::StartTrackingRequestEvent(options) => {
                                debug!("Start tracking request received in LocationModule");
                                // Failures are published by the session.
                                let _ = self.session.start_tracking_with(options);
                            }
                            EventKind::StopTrackingRequestEvent => {
                                debug!("Stop tracking request received in LocationModule");
                                self.session.stop_tracking();
                            }
                            EventKind::LastKnownPositionRequestEvent => {
                                self.on_last_known_position_request();
                            }
                            _ => (),
                        },
                        Err(RecvError::Lagged(skipped)) => {
                            error!("LocationModule lagged behind by {skipped} events");
                        }
                        Err(RecvError::Closed) => {
                            error!("Event bus closed, stopping LocationModule");
                            self.session.stop_tracking();
                            run = false;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
