//! Cast Plus Monitor - headless receiver discovery monitor.
//!
//! Browses the local network for cast and mirroring receivers through the
//! Cast Plus core and logs every device-list change and status event until
//! interrupted or until the configured watch window elapses.

mod backend;
mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use castplus_core::discovery::MdnsConfig;
use castplus_core::{
    bootstrap_cast_service, Collaborators, DeviceListEvent, DiscoveryFeed, LoggingEventEmitter,
    MdnsDiscoveryFeed, StatusEvent, TokioSpawner, TransportFamily,
};
use clap::{Parser, ValueEnum};
use tokio::signal;

use crate::backend::NoSessionBackend;
use crate::config::MonitorConfig;

/// Transport families selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FamilyArg {
    Cast,
    Mirroring,
    All,
}

impl FamilyArg {
    fn families(self) -> Vec<TransportFamily> {
        match self {
            Self::Cast => vec![TransportFamily::Cast],
            Self::Mirroring => vec![TransportFamily::Mirroring],
            Self::All => vec![TransportFamily::Cast, TransportFamily::Mirroring],
        }
    }
}

/// Cast Plus Monitor - Watch media receivers appear and disappear.
#[derive(Parser, Debug)]
#[command(name = "castplus-monitor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "CASTPLUS_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Transport families to browse for (overrides config file).
    #[arg(short, long, value_enum)]
    family: Option<FamilyArg>,

    /// Seconds to watch before exiting, 0 = until Ctrl+C (overrides config file).
    #[arg(short, long)]
    watch_secs: Option<u64>,

    /// Receiver application id devices must run (overrides config file).
    #[arg(short, long)]
    receiver_app_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Cast Plus Monitor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        MonitorConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(family) = args.family {
        config.families = family.families();
    }
    if let Some(secs) = args.watch_secs {
        config.watch_secs = secs;
    }
    if let Some(app_id) = args.receiver_app_id {
        config.receiver_app_id = app_id;
    }

    log::info!(
        "Configuration: receiver_app_id={}, families={:?}, watch_secs={}",
        config.receiver_app_id,
        config.families,
        config.watch_secs
    );

    let spawner = TokioSpawner::current();

    let mut feeds: Vec<Arc<dyn DiscoveryFeed>> = Vec::new();
    for family in &config.families {
        let feed = MdnsDiscoveryFeed::new(MdnsConfig::new(*family), spawner.clone())
            .with_context(|| format!("Failed to start mDNS daemon for {}", family))?;
        feeds.push(Arc::new(feed));
    }

    let backend = Arc::new(NoSessionBackend);
    let service = bootstrap_cast_service(
        &config.to_core_config(),
        Collaborators {
            session_sdk: backend.clone(),
            media_transport: backend,
            feeds,
        },
        spawner,
    )
    .context("Failed to bootstrap cast service")?;

    service.relay().set_mirror(Arc::new(LoggingEventEmitter));
    let mut devices = service.subscribe_devices();
    let mut status = service.subscribe_status();

    service
        .initialize()
        .context("Failed to initialize discovery")?;

    let watch = async {
        match config.watch_secs {
            0 => std::future::pending::<()>().await,
            secs => tokio::time::sleep(Duration::from_secs(secs)).await,
        }
    };
    tokio::pin!(watch);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = devices.recv() => log_devices(&event),
            Some(event) = status.recv() => log_status(&event),
            _ = &mut shutdown => {
                log::info!("Shutdown signal received, cleaning up...");
                break;
            }
            _ = &mut watch => {
                log::info!("Watch window of {}s elapsed", config.watch_secs);
                break;
            }
        }
    }

    service.shutdown();

    log::info!("Shutdown complete");
    Ok(())
}

fn log_devices(event: &DeviceListEvent) {
    if event.devices.is_empty() {
        log::info!("No receivers discovered");
        return;
    }
    log::info!("{} receiver(s):", event.devices.len());
    for device in &event.devices {
        log::info!("  {:<32} {}", device.device_name, device.device_id);
    }
}

fn log_status(event: &StatusEvent) {
    match event.error() {
        Some(error) => log::warn!("[{}] {:?}: {}", event.device_name(), event.kind(), error),
        None => log::info!("[{}] {:?}", event.device_name(), event.kind()),
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
