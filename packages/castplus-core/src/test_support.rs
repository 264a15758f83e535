//! Test doubles for the collaborator traits.
//!
//! The mocks record every call and let tests fire SDK signals by hand, on the
//! test thread, after the call under test has returned.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::discovery::{DiscoveryNotification, DiscoveryResult, NativeHandle, TransportFamily};
use crate::events::{DeviceListEvent, EventEmitter, StatusEvent, StatusKind};
use crate::media::LoadRequest;
use crate::sdk::{
    DiscoveryFeed, DiscoverySink, MediaListener, MediaSignal, MediaTransport, RequestHandle,
    SdkError, SessionListener, SessionSdk, SessionSignal,
};
use crate::session::AttemptId;

/// Emitter that records everything it receives.
#[derive(Default)]
pub struct RecordingEmitter {
    statuses: Mutex<Vec<StatusEvent>>,
    device_lists: Mutex<Vec<DeviceListEvent>>,
}

impl RecordingEmitter {
    pub fn statuses(&self) -> Vec<StatusEvent> {
        self.statuses.lock().clone()
    }

    pub fn status_kinds(&self) -> Vec<StatusKind> {
        self.statuses.lock().iter().map(StatusEvent::kind).collect()
    }

    pub fn device_lists(&self) -> Vec<DeviceListEvent> {
        self.device_lists.lock().clone()
    }

    /// Device ids of the most recent device-list event.
    pub fn last_device_ids(&self) -> Vec<String> {
        self.device_lists
            .lock()
            .last()
            .map(|event| event.devices.iter().map(|d| d.device_id.clone()).collect())
            .unwrap_or_default()
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit_status(&self, event: StatusEvent) {
        self.statuses.lock().push(event);
    }

    fn emit_device_list(&self, event: DeviceListEvent) {
        self.device_lists.lock().push(event);
    }
}

/// Session SDK double.
#[derive(Default)]
pub struct MockSessionSdk {
    listeners: Mutex<Vec<SessionListener>>,
    detached: Mutex<Vec<AttemptId>>,
    started: Mutex<Vec<String>>,
    end_calls: Mutex<usize>,
    start_error: Mutex<Option<SdkError>>,
}

impl MockSessionSdk {
    /// Makes the next `start_session` call fail synchronously.
    pub fn fail_next_start(&self, error: SdkError) {
        *self.start_error.lock() = Some(error);
    }

    /// Unique ids passed to `start_session`.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    pub fn end_calls(&self) -> usize {
        *self.end_calls.lock()
    }

    pub fn detached(&self) -> Vec<AttemptId> {
        self.detached.lock().clone()
    }

    pub fn attached_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Returns the listener attached at position `index`, detached or not.
    pub fn listener(&self, index: usize) -> SessionListener {
        self.listeners.lock()[index].clone()
    }

    /// Delivers `signal` to the most recently attached listener.
    pub fn fire(&self, signal: SessionSignal) {
        let listener = self.listeners.lock().last().cloned();
        if let Some(listener) = listener {
            listener.deliver(signal);
        }
    }
}

impl SessionSdk for MockSessionSdk {
    fn attach_listener(&self, listener: SessionListener) {
        self.listeners.lock().push(listener);
    }

    fn detach_listener(&self, attempt: AttemptId) {
        self.detached.lock().push(attempt);
    }

    fn start_session(&self, device: &NativeHandle) -> Result<(), SdkError> {
        self.started.lock().push(device.unique_id.clone());
        match self.start_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn end_session(&self) -> Result<(), SdkError> {
        *self.end_calls.lock() += 1;
        Ok(())
    }
}

/// Media transport double.
#[derive(Default)]
pub struct MockMediaTransport {
    loads: Mutex<Vec<LoadRequest>>,
    listeners: Mutex<Vec<MediaListener>>,
    released: Mutex<Vec<AttemptId>>,
    load_error: Mutex<Option<SdkError>>,
    inline_signals: Mutex<Vec<MediaSignal>>,
}

impl MockMediaTransport {
    /// Makes the next `load_media` call fail synchronously.
    pub fn fail_next_load(&self, error: SdkError) {
        *self.load_error.lock() = Some(error);
    }

    /// Delivers `signals` from inside the next `load_media` call, before it
    /// returns.
    pub fn signal_during_load(&self, signals: Vec<MediaSignal>) {
        *self.inline_signals.lock() = signals;
    }

    pub fn loads(&self) -> Vec<LoadRequest> {
        self.loads.lock().clone()
    }

    pub fn released(&self) -> Vec<AttemptId> {
        self.released.lock().clone()
    }

    /// Delivers `signal` to the most recent load's listener.
    pub fn fire(&self, signal: MediaSignal) {
        let listener = self.listeners.lock().last().cloned();
        if let Some(listener) = listener {
            listener.deliver(signal);
        }
    }
}

impl MediaTransport for MockMediaTransport {
    fn load_media(
        &self,
        request: &LoadRequest,
        listener: MediaListener,
    ) -> Result<RequestHandle, SdkError> {
        let handle = {
            let mut loads = self.loads.lock();
            loads.push(request.clone());
            RequestHandle(loads.len() as u64)
        };
        self.listeners.lock().push(listener.clone());

        let inline = std::mem::take(&mut *self.inline_signals.lock());
        for signal in inline {
            listener.deliver(signal);
        }

        match self.load_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(handle),
        }
    }

    fn release_listener(&self, attempt: AttemptId) {
        self.released.lock().push(attempt);
    }
}

/// Discovery feed double.
#[derive(Default)]
pub struct MockFeed {
    devices: Mutex<Vec<NativeHandle>>,
    sink: Mutex<Option<DiscoverySink>>,
    attach_calls: Mutex<usize>,
    shutdown_calls: Mutex<usize>,
}

impl MockFeed {
    pub fn with_devices(devices: Vec<NativeHandle>) -> Self {
        Self {
            devices: Mutex::new(devices),
            ..Default::default()
        }
    }

    /// Pushes a notification through the attached sink.
    pub fn push(&self, notification: DiscoveryNotification) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink.notify(notification);
        }
    }

    pub fn attach_calls(&self) -> usize {
        *self.attach_calls.lock()
    }

    pub fn shutdown_calls(&self) -> usize {
        *self.shutdown_calls.lock()
    }
}

impl DiscoveryFeed for MockFeed {
    fn attach(&self, sink: DiscoverySink) -> DiscoveryResult<()> {
        *self.attach_calls.lock() += 1;
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    fn current_devices(&self) -> Vec<NativeHandle> {
        self.devices.lock().clone()
    }

    fn shutdown(&self) {
        *self.shutdown_calls.lock() += 1;
    }
}

/// Builds a cast-family handle.
pub fn cast_handle(id: &str, name: &str) -> NativeHandle {
    NativeHandle::new(id, name, TransportFamily::Cast)
}

/// Convenience for tests that need the mocks behind trait objects.
pub fn mocks() -> (Arc<MockSessionSdk>, Arc<MockMediaTransport>) {
    (
        Arc::new(MockSessionSdk::default()),
        Arc::new(MockMediaTransport::default()),
    )
}
