//! Discovery watcher: bridges discovery feeds into the device registry.
//!
//! Feeds push notifications from their own threads. The watcher serializes
//! them, applies exactly one registry mutation per notification and publishes
//! the resulting device list. There is no debouncing; every accepted
//! notification produces one publish.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::discovery::{Device, DeviceRegistry, DiscoveryNotification, NativeHandle, ReceiverSelector};
use crate::events::{DeviceListEvent, EventEmitter};

/// Single writer of the [`DeviceRegistry`].
pub struct DiscoveryWatcher {
    registry: Arc<DeviceRegistry>,
    emitter: Arc<dyn EventEmitter>,
    selector: ReceiverSelector,
    /// Serializes mutation and publish so publishes follow mutation order.
    write_lock: Mutex<()>,
}

impl DiscoveryWatcher {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        emitter: Arc<dyn EventEmitter>,
        selector: ReceiverSelector,
    ) -> Self {
        Self {
            registry,
            emitter,
            selector,
            write_lock: Mutex::new(()),
        }
    }

    pub fn selector(&self) -> &ReceiverSelector {
        &self.selector
    }

    /// Applies one feed notification.
    pub fn handle(&self, notification: DiscoveryNotification) {
        let _guard = self.write_lock.lock();

        match notification {
            DiscoveryNotification::Added(handle) | DiscoveryNotification::Updated(handle) => {
                let device = match Device::from_native(handle) {
                    Ok(device) => device,
                    Err(e) => {
                        log::warn!("[Discovery] Ignoring device: {}", e);
                        return;
                    }
                };

                if self.selector.matches(&device.handle) {
                    let is_new = self.registry.upsert(device.clone());
                    log::info!(
                        "[Discovery] {} {} ({}, {})",
                        if is_new { "Found" } else { "Updated" },
                        device.display_name,
                        device.id,
                        device.handle.family
                    );
                } else if self.registry.remove(&device.id).is_some() {
                    log::info!(
                        "[Discovery] {} no longer runs {}, removed",
                        device.display_name,
                        self.selector.app_id()
                    );
                } else {
                    log::debug!(
                        "[Discovery] Skipping {} ({}): does not run {}",
                        device.display_name,
                        device.id,
                        self.selector.app_id()
                    );
                    return;
                }
            }
            DiscoveryNotification::Removed(handle) => {
                let id = match handle.device_id() {
                    Ok(id) => id,
                    Err(e) => {
                        log::warn!("[Discovery] Ignoring removal: {}", e);
                        return;
                    }
                };
                match self.registry.remove(&id) {
                    Some(device) => log::info!("[Discovery] Lost {} ({})", device.display_name, id),
                    None => log::debug!("[Discovery] Removal of unknown device {}", id),
                }
            }
        }

        self.publish();
    }

    /// Replaces the registry content with the given handles and publishes once.
    ///
    /// Handles without a stable id or not matching the selector are skipped.
    pub fn resync(&self, handles: Vec<NativeHandle>) {
        let _guard = self.write_lock.lock();

        let devices: Vec<Device> = handles
            .into_iter()
            .filter(|handle| self.selector.matches(handle))
            .filter_map(|handle| match Device::from_native(handle) {
                Ok(device) => Some(device),
                Err(e) => {
                    log::warn!("[Discovery] Ignoring device during resync: {}", e);
                    None
                }
            })
            .collect();

        self.registry.replace_all(devices);
        log::info!("[Discovery] Resynced: {} device(s)", self.registry.len());
        self.publish();
    }

    fn publish(&self) {
        self.emitter
            .emit_device_list(DeviceListEvent::new(self.registry.summaries()));
    }
}
