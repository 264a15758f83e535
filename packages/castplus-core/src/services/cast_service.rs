//! Caller-facing facade.
//!
//! [`CastService`] exposes the boundary operations (initialize, list, connect,
//! disconnect, subscribe) over the discovery watcher, session controller and
//! event relay. It is constructed by
//! [`bootstrap_cast_service`](crate::bootstrap::bootstrap_cast_service) and
//! passed by reference to whichever layer needs it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::discovery::{DeviceRegistry, DeviceSummary};
use crate::error::CastResult;
use crate::events::{DeviceListEvent, EventRelay, StatusEvent};
use crate::media::MediaRequest;
use crate::sdk::{DiscoveryFeed, DiscoverySink};
use crate::session::{Completion, ConnectRequest, SessionState};

use super::{DiscoveryWatcher, SessionController};

/// Entry point for host applications.
pub struct CastService {
    registry: Arc<DeviceRegistry>,
    relay: Arc<EventRelay>,
    watcher: Arc<DiscoveryWatcher>,
    controller: SessionController,
    feeds: Vec<Arc<dyn DiscoveryFeed>>,
    initialized: AtomicBool,
}

impl CastService {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        relay: Arc<EventRelay>,
        watcher: Arc<DiscoveryWatcher>,
        controller: SessionController,
        feeds: Vec<Arc<dyn DiscoveryFeed>>,
    ) -> Self {
        Self {
            registry,
            relay,
            watcher,
            controller,
            feeds,
            initialized: AtomicBool::new(false),
        }
    }

    /// Sets up the discovery subsystem. Idempotent and always succeeds.
    ///
    /// Attaches every feed once, then reconciles the registry with what the
    /// feeds already know. A feed that fails to attach is logged and skipped.
    pub fn initialize(&self) -> CastResult<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            log::debug!("[Discovery] Already initialized");
            return Ok(());
        }

        for feed in &self.feeds {
            if let Err(e) = feed.attach(DiscoverySink::new(&self.watcher)) {
                log::warn!("[Discovery] Failed to attach feed: {}", e);
            }
        }

        let known = self
            .feeds
            .iter()
            .flat_map(|feed| feed.current_devices())
            .collect();
        self.watcher.resync(known);

        log::info!(
            "[Discovery] Initialized with {} feed(s), receiver app {}",
            self.feeds.len(),
            self.watcher.selector().app_id()
        );
        Ok(())
    }

    /// Returns the currently discovered devices.
    pub fn list_devices(&self) -> Vec<DeviceSummary> {
        self.registry.summaries()
    }

    /// Starts casting `url` to a device and returns the pending completion.
    ///
    /// Synchronous failures (bad arguments, unknown device, attempt in
    /// progress) are returned directly.
    pub fn begin_connect(
        &self,
        device_id: &str,
        device_unique_id: Option<&str>,
        url: &str,
        title: &str,
    ) -> CastResult<Completion> {
        let mut request = ConnectRequest::new(device_id, MediaRequest::new(url, title));
        if let Some(unique_id) = device_unique_id {
            request = request.with_unique_id(unique_id);
        }
        self.connect_with(request)
    }

    /// Starts a session from a fully built request.
    pub fn connect_with(&self, request: ConnectRequest) -> CastResult<Completion> {
        self.controller.connect(request)
    }

    /// Casts `url` to a device and waits for the outcome.
    pub async fn connect(
        &self,
        device_id: &str,
        device_unique_id: Option<&str>,
        url: &str,
        title: &str,
    ) -> CastResult<()> {
        self.begin_connect(device_id, device_unique_id, url, title)?
            .await
    }

    /// Requests the current session to end. The outcome follows on the
    /// status stream.
    pub fn disconnect(&self) {
        self.controller.disconnect();
    }

    /// Returns a completion resolved when the current session concludes.
    pub fn wait_for_end(&self) -> Option<Completion> {
        self.controller.wait_for_end()
    }

    /// Subscribes to device-list changes; the current list arrives first.
    pub fn subscribe_devices(&self) -> mpsc::UnboundedReceiver<DeviceListEvent> {
        self.relay.subscribe_devices()
    }

    /// Subscribes to status events. No history is replayed.
    pub fn subscribe_status(&self) -> mpsc::UnboundedReceiver<StatusEvent> {
        self.relay.subscribe_status()
    }

    pub fn unsubscribe_devices(&self) {
        self.relay.unsubscribe_devices();
    }

    pub fn unsubscribe_status(&self) {
        self.relay.unsubscribe_status();
    }

    pub fn session_state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn active_device(&self) -> Option<DeviceSummary> {
        self.controller.active_device()
    }

    /// Returns the event relay, e.g. to attach a mirror emitter.
    pub fn relay(&self) -> &Arc<EventRelay> {
        &self.relay
    }

    /// Stops every discovery feed.
    pub fn shutdown(&self) {
        log::info!("[Discovery] Shutting down {} feed(s)", self.feeds.len());
        for feed in &self.feeds {
            feed.shutdown();
        }
    }
}
