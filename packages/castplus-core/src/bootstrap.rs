//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root, the single place where the
//! registry, relay, watcher, sequencer and controller are instantiated and
//! wired to the host's collaborators. Nothing in the crate reaches for a
//! process-wide instance; hosts own the returned [`CastService`].

use std::sync::Arc;

use crate::config::Config;
use crate::discovery::DeviceRegistry;
use crate::error::CastResult;
use crate::events::{EventEmitter, EventRelay};
use crate::runtime::TokioSpawner;
use crate::sdk::{DiscoveryFeed, MediaTransport, SessionSdk};
use crate::services::{CastService, DiscoveryWatcher, MediaLoadSequencer, SessionController};

/// Collaborator adapters supplied by the host.
pub struct Collaborators {
    /// Session half of the vendor SDK.
    pub session_sdk: Arc<dyn SessionSdk>,
    /// Media half of the vendor SDK.
    pub media_transport: Arc<dyn MediaTransport>,
    /// Discovery feeds, one per transport family in use.
    pub feeds: Vec<Arc<dyn DiscoveryFeed>>,
}

/// Builds a ready-to-use [`CastService`].
///
/// Wiring order:
///
/// 1. Device registry and event relay (depends on registry)
/// 2. Discovery watcher (registry, relay, receiver selector)
/// 3. Media load sequencer (media transport, media defaults, relay)
/// 4. Session controller (registry, session SDK, sequencer, relay, spawner)
///
/// Discovery does not start until [`CastService::initialize`] is called.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn bootstrap_cast_service(
    config: &Config,
    collaborators: Collaborators,
    spawner: TokioSpawner,
) -> CastResult<Arc<CastService>> {
    config.validate()?;

    let registry = Arc::new(DeviceRegistry::new());
    let relay = Arc::new(EventRelay::new(Arc::clone(&registry)));

    let watcher = Arc::new(DiscoveryWatcher::new(
        Arc::clone(&registry),
        Arc::clone(&relay) as Arc<dyn EventEmitter>,
        config.selector(),
    ));

    let sequencer = MediaLoadSequencer::new(
        collaborators.media_transport,
        config.media.clone(),
        Arc::clone(&relay) as Arc<dyn EventEmitter>,
    );

    let controller = SessionController::new(
        Arc::clone(&registry),
        collaborators.session_sdk,
        sequencer,
        Arc::clone(&relay) as Arc<dyn EventEmitter>,
        spawner,
        config.stop_timeout(),
    );

    log::info!(
        "[Bootstrap] Cast service ready (receiver app {}, {} feed(s), stop timeout {})",
        config.receiver_app_id,
        collaborators.feeds.len(),
        config
            .stop_timeout()
            .map_or_else(|| "disabled".to_string(), |t| format!("{}ms", t.as_millis()))
    );

    Ok(Arc::new(CastService::new(
        registry,
        relay,
        watcher,
        controller,
        collaborators.feeds,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mocks;

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let (sdk, transport) = mocks();
        let config = Config {
            receiver_app_id: String::new(),
            ..Default::default()
        };
        let result = bootstrap_cast_service(
            &config,
            Collaborators {
                session_sdk: sdk,
                media_transport: transport,
                feeds: vec![],
            },
            TokioSpawner::current(),
        );
        assert!(matches!(result, Err(e) if e.code() == "configuration_error"));
    }

    #[tokio::test]
    async fn bootstrapped_service_starts_idle_and_empty() {
        let (sdk, transport) = mocks();
        let service = bootstrap_cast_service(
            &Config::default(),
            Collaborators {
                session_sdk: sdk,
                media_transport: transport,
                feeds: vec![],
            },
            TokioSpawner::current(),
        )
        .unwrap();

        assert!(service.initialize().is_ok());
        assert!(service.list_devices().is_empty());
        assert_eq!(service.session_state(), crate::session::SessionState::Idle);
    }
}
