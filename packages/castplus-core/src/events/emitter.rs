//! Event emitter abstraction for decoupling services from delivery.
//!
//! Services depend on the [`EventEmitter`] trait rather than concrete channels,
//! enabling testing and alternative delivery (UI bridge, logs).

use super::{DeviceListEvent, StatusEvent};

/// Trait for emitting domain events without knowledge of delivery.
///
/// # Example
///
/// ```ignore
/// struct MyService {
///     emitter: Arc<dyn EventEmitter>,
/// }
///
/// impl MyService {
///     fn started(&self) {
///         self.emitter.emit_status(StatusEvent::session_started("Den TV"));
///     }
/// }
/// ```
pub trait EventEmitter: Send + Sync {
    /// Emits a session or media status event.
    fn emit_status(&self, event: StatusEvent);

    /// Emits a device-list change.
    fn emit_device_list(&self, event: DeviceListEvent);
}

/// No-op emitter. Events are silently discarded.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_status(&self, _event: StatusEvent) {}

    fn emit_device_list(&self, _event: DeviceListEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level. Without a `tracing` subscriber the records
/// go to the `log` facade, so hosts running `env_logger` see them too.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_status(&self, event: StatusEvent) {
        tracing::debug!(?event, "status_event");
    }

    fn emit_device_list(&self, event: DeviceListEvent) {
        tracing::debug!(devices = event.devices.len(), "device_list_event");
    }
}
