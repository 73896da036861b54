// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use async_trait::async_trait;
use clap::{CommandFactory, Parser};
use common::{
    error::LocationError,
    options::{AccuracyProfile, LocationOptions},
    position::PositionSample,
    provider::{AccuracyClass, PowerClass, ProviderDescriptor, ProviderId},
};
use location_service::{
    LocationService, gpsd::GpsdLocationService, simulated::SimulatedLocationService,
};
use location_session::LocationModule;
use module_core::{Event, EventBus, EventKind, Module, ModuleCtx};
use std::{collections::BTreeSet, sync::Arc, time::Duration};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address of the gpsd daemon, e.g. 127.0.0.1:2947
    #[arg(short = 'd', long)]
    gpsd: Option<String>,
    /// CSV file with recorded samples to replay
    #[arg(short = 'r', long)]
    replay: Option<String>,
    /// Time between two replayed samples in milliseconds
    #[arg(long, default_value_t = 1000)]
    replay_interval_ms: u64,
    /// Accuracy profile by name or index, e.g. best or 3
    #[arg(short, long, default_value = "best", value_parser = parse_profile)]
    accuracy: AccuracyProfile,
    /// Minimum time between two provider updates in milliseconds
    #[arg(short, long, default_value_t = 0)]
    interval_ms: u64,
    /// Minimum displacement between two provider updates in meters
    #[arg(long, default_value_t = 0.0)]
    distance_filter: f32,
}

fn parse_profile(profile: &str) -> Result<AccuracyProfile, LocationError> {
    AccuracyProfile::parse(profile)
}

/// Logs every position and error published on the bus.
struct PositionLogger {
    ctx: ModuleCtx,
}

#[async_trait]
impl Module for PositionLogger {
    async fn run(&mut self) -> Result<(), ()> {
        let mut run = true;
        while run {
            tokio::select! {
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => match event.kind {
                            EventKind::QuitEvent => run = false,
                            EventKind::PositionChangedEvent(sample) => info!(
                                "Position {:.7}, {:.7} accuracy {} m from {}",
                                sample.latitude(),
                                sample.longitude(),
                                sample.accuracy(),
                                sample.provider().map_or("unknown", ProviderId::as_str)
                            ),
                            EventKind::LocationErrorEvent(e) => error!("Location error: {e}"),
                            _ => (),
                        },
                        Err(RecvError::Lagged(skipped)) => error!("Logger lagged behind by {skipped} events"),
                        Err(RecvError::Closed) => run = false,
                    }
                }
            }
        }
        Ok(())
    }
}

fn read_samples_from_file(file_path: &str) -> Result<Vec<PositionSample>, ()> {
    let mut rdr = csv::Reader::from_path(file_path).map_err(|e| {
        error!("Failed to open {file_path}. Error: {e}");
    })?;
    let samples = rdr
        .deserialize()
        .collect::<Result<Vec<PositionSample>, _>>()
        .map_err(|e| {
            error!("Failed to read samples from {file_path}. Error: {e}");
        })?;
    debug!("length of samples: {}", samples.len());
    Ok(samples)
}

fn descriptor_for(id: &ProviderId) -> ProviderDescriptor {
    if id == ProviderId::GPS {
        ProviderDescriptor::new(id.clone(), AccuracyClass::Fine, PowerClass::High)
    } else {
        ProviderDescriptor::new(id.clone(), AccuracyClass::Coarse, PowerClass::Low)
    }
}

fn create_replay_service(
    file_path: &str,
    interval: Duration,
) -> Result<Arc<SimulatedLocationService>, ()> {
    let samples = read_samples_from_file(file_path)?;
    let providers = samples
        .iter()
        .filter_map(|sample| sample.provider().cloned())
        .collect::<BTreeSet<_>>();
    let service = Arc::new(SimulatedLocationService::with_providers(
        providers.iter().map(descriptor_for),
    ));
    service.replay(samples, interval);
    Ok(service)
}

async fn run_modules<S: LocationService + 'static>(
    eb: &EventBus,
    service: Arc<S>,
    options: LocationOptions,
) -> Result<(), ()> {
    let mut location = LocationModule::new(eb.context(), service);
    let mut logger = PositionLogger { ctx: eb.context() };

    let sender = eb.sender();
    ctrlc::set_handler(move || {
        let _ = sender.send(Event {
            kind: EventKind::QuitEvent,
        });
    })
    .map_err(|e| error!("Failed to set signal handler. Error: {e}"))?;

    eb.publish(&Event {
        kind: EventKind::StartTrackingRequestEvent(options),
    });

    info!("Starting modules...");
    let (location, logger) = tokio::join!(location.run(), logger.run());
    location.and(logger)
}

#[tokio::main]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = LocationOptions {
        accuracy: cli.accuracy,
        time_interval_ms: cli.interval_ms,
        distance_filter_m: cli.distance_filter,
    };
    options.validate().map_err(|e| error!("{e}"))?;

    let eb = EventBus::default();
    if let Some(address) = &cli.gpsd {
        let service = GpsdLocationService::connect(address)
            .await
            .map_err(|e| error!("Failed to connect to gpsd!. Error: {e}"))?;
        run_modules(&eb, Arc::new(service), options).await
    } else if let Some(file_path) = &cli.replay {
        let interval = Duration::from_millis(cli.replay_interval_ms);
        let service = create_replay_service(file_path, interval)?;
        run_modules(&eb, service, options).await
    } else {
        error!("No location source specified. Use --gpsd or --replay");
        let _ = Cli::command().print_help();
        Err(())
    }
}
