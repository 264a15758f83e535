//! Single-subscriber relay from domain events to the caller.
//!
//! Each event family has at most one registered sink. Subscribing again
//! replaces the previous sink, and events published while no sink is
//! registered are dropped. There is no history: a late subscriber only sees
//! what is published after it attached, except for the device list which is
//! sent once on subscription.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;

use super::emitter::EventEmitter;
use super::{DeviceListEvent, StatusEvent};
use crate::discovery::DeviceRegistry;

/// Delivers status and device-list events to the current subscriber.
///
/// Optionally mirrors every event to a secondary emitter (e.g. a logger) that
/// can be set after construction.
pub struct EventRelay {
    registry: Arc<DeviceRegistry>,
    status_sink: Mutex<Option<mpsc::UnboundedSender<StatusEvent>>>,
    device_sink: Mutex<Option<mpsc::UnboundedSender<DeviceListEvent>>>,
    mirror: RwLock<Option<Arc<dyn EventEmitter>>>,
}

impl EventRelay {
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        Self {
            registry,
            status_sink: Mutex::new(None),
            device_sink: Mutex::new(None),
            mirror: RwLock::new(None),
        }
    }

    /// Registers the status subscriber, replacing any previous one.
    pub fn subscribe_status(&self) -> mpsc::UnboundedReceiver<StatusEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.status_sink.lock().replace(tx).is_some() {
            log::debug!("[Relay] Replaced previous status subscriber");
        }
        rx
    }

    /// Registers the device-list subscriber, replacing any previous one.
    ///
    /// The current registry snapshot is delivered immediately.
    pub fn subscribe_devices(&self) -> mpsc::UnboundedReceiver<DeviceListEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sink = self.device_sink.lock();
        // Receiver is alive in this scope, send cannot fail.
        let _ = tx.send(DeviceListEvent::new(self.registry.summaries()));
        if sink.replace(tx).is_some() {
            log::debug!("[Relay] Replaced previous device-list subscriber");
        }
        rx
    }

    pub fn unsubscribe_status(&self) {
        self.status_sink.lock().take();
    }

    pub fn unsubscribe_devices(&self) {
        self.device_sink.lock().take();
    }

    /// Sets an emitter that receives a copy of every event.
    pub fn set_mirror(&self, emitter: Arc<dyn EventEmitter>) {
        *self.mirror.write() = Some(emitter);
    }

    /// Returns true if a status subscriber is registered and still listening.
    pub fn has_status_subscriber(&self) -> bool {
        self.status_sink
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

/// Sends to the sink in `slot`, clearing it if the receiver is gone.
fn deliver<T>(slot: &Mutex<Option<mpsc::UnboundedSender<T>>>, event: T, family: &str) {
    let mut sink = slot.lock();
    let Some(tx) = sink.as_ref() else {
        log::trace!("[Relay] No {} subscriber, dropping event", family);
        return;
    };
    if tx.send(event).is_err() {
        log::debug!("[Relay] {} subscriber went away", family);
        sink.take();
    }
}

impl EventEmitter for EventRelay {
    fn emit_status(&self, event: StatusEvent) {
        if let Some(ref mirror) = *self.mirror.read() {
            mirror.emit_status(event.clone());
        }
        deliver(&self.status_sink, event, "status");
    }

    fn emit_device_list(&self, event: DeviceListEvent) {
        if let Some(ref mirror) = *self.mirror.read() {
            mirror.emit_device_list(event.clone());
        }
        deliver(&self.device_sink, event, "device-list");
    }
}
