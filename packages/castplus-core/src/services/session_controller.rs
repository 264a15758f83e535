//! Session controller: the per-attempt state machine.
//!
//! Owns the single [`SessionAttempt`] slot. Caller requests (`connect`,
//! `disconnect`) and SDK signals (session and media) are serialized through
//! one mutex, and SDK calls are always made after releasing it so a collaborator
//! that signals synchronously cannot deadlock the controller.
//!
//! Every signal handler first checks that the signal belongs to the current
//! attempt. Signals for an attempt that has already concluded are logged and
//! dropped; the controller detaches listeners itself once an attempt concludes.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use crate::discovery::{DeviceRegistry, DeviceSummary};
use crate::error::{CastError, CastResult};
use crate::events::{EventEmitter, StatusEvent};
use crate::media::LoadRequest;
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::sdk::{
    MediaListener, MediaSignal, SdkError, SessionListener, SessionSdk, SessionSignal, SignalTarget,
};
use crate::session::{
    AttemptId, AttemptState, Completion, ConnectRequest, SessionAttempt, SessionState,
};

use super::media_sequencer::{MediaLoadSequencer, MediaOutcome};

type AttemptSlot<'a> = MutexGuard<'a, Option<SessionAttempt>>;

/// Drives session attempts from connect to conclusion.
///
/// Cheap to clone; clones share the same attempt slot.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

struct Shared {
    weak: Weak<Shared>,
    registry: Arc<DeviceRegistry>,
    sdk: Arc<dyn SessionSdk>,
    sequencer: MediaLoadSequencer,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    stop_timeout: Option<Duration>,
    attempt: Mutex<Option<SessionAttempt>>,
}

impl SessionController {
    /// Creates a controller.
    ///
    /// `stop_timeout` bounds how long a stop request waits for the SDK's
    /// ended signal; `None` waits indefinitely.
    pub fn new(
        registry: Arc<DeviceRegistry>,
        sdk: Arc<dyn SessionSdk>,
        sequencer: MediaLoadSequencer,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
        stop_timeout: Option<Duration>,
    ) -> Self {
        let shared = Arc::new_cyclic(|weak| Shared {
            weak: weak.clone(),
            registry,
            sdk,
            sequencer,
            emitter,
            spawner,
            stop_timeout,
            attempt: Mutex::new(None),
        });
        Self { shared }
    }

    /// Starts a session attempt and returns its pending completion.
    ///
    /// Argument, lookup and concurrency errors are returned synchronously and
    /// leave the controller untouched. Everything after that (start failure,
    /// load failure, abnormal end) arrives through the completion.
    pub fn connect(&self, request: ConnectRequest) -> CastResult<Completion> {
        request.validate()?;
        let shared = &self.shared;

        let (id, handle, completion) = {
            let mut slot = shared.attempt.lock();
            if slot.is_some() {
                return Err(CastError::SessionAlreadyInProgress);
            }

            let device_id = request.device_id.trim();
            let device = shared
                .registry
                .lookup(device_id)
                .ok_or_else(|| CastError::DeviceNotFound(device_id.to_string()))?;
            if let Some(unique_id) = request
                .device_unique_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
            {
                if unique_id != device.handle.unique_id {
                    return Err(CastError::DeviceNotFound(device_id.to_string()));
                }
            }

            let handle = device.handle.clone();
            let (attempt, completion) = SessionAttempt::new(device, request.media);
            let id = attempt.id;
            log::info!(
                "[Session] Connecting to {} ({}) attempt={}",
                attempt.device.display_name,
                handle.family,
                id
            );
            *slot = Some(attempt);
            (id, handle, completion)
        };

        shared
            .sdk
            .attach_listener(SessionListener::new(id, shared.target()));
        if let Err(error) = shared.sdk.start_session(&handle) {
            log::warn!("[Session] start_session rejected: {}", error);
            shared.on_session_signal(id, SessionSignal::StartFailed(error));
        }

        Ok(completion)
    }

    /// Requests the current session to end.
    ///
    /// Fire-and-forget: the attempt concludes when the SDK reports the end
    /// (or the stop timeout fires), never synchronously here.
    pub fn disconnect(&self) {
        let shared = &self.shared;
        let id = {
            let mut slot = shared.attempt.lock();
            match slot.as_mut() {
                None => None,
                Some(attempt) if attempt.state == AttemptState::Ending => {
                    log::debug!("[Session] Stop already requested for {}", attempt.id);
                    return;
                }
                Some(attempt) => {
                    log::info!(
                        "[Session] Stopping session on {} ({:?})",
                        attempt.device.display_name,
                        attempt.state
                    );
                    attempt.state = AttemptState::Ending;
                    Some(attempt.id)
                }
            }
        };

        if id.is_none() {
            log::debug!("[Session] No attempt in progress, requesting end anyway");
        }
        if let Err(error) = shared.sdk.end_session() {
            log::warn!("[Session] end_session failed: {}", error);
        }
        if let Some(id) = id {
            self.arm_stop_timeout(id);
        }
    }

    /// Returns a completion resolved when the current attempt concludes, or
    /// `None` when idle.
    pub fn wait_for_end(&self) -> Option<Completion> {
        self.shared
            .attempt
            .lock()
            .as_mut()
            .map(SessionAttempt::wait_for_end)
    }

    pub fn state(&self) -> SessionState {
        self.shared
            .attempt
            .lock()
            .as_ref()
            .map_or(SessionState::Idle, |attempt| attempt.state.into())
    }

    /// Returns the device of the current attempt.
    pub fn active_device(&self) -> Option<DeviceSummary> {
        self.shared
            .attempt
            .lock()
            .as_ref()
            .map(|attempt| attempt.device.summary())
    }

    fn arm_stop_timeout(&self, id: AttemptId) {
        let Some(timeout) = self.shared.stop_timeout else {
            return;
        };
        let weak = Arc::downgrade(&self.shared);
        self.shared.spawner.spawn_after(timeout, async move {
            if let Some(shared) = weak.upgrade() {
                shared.expire_stop(id, timeout);
            }
        });
    }
}

impl Shared {
    fn target(&self) -> Weak<dyn SignalTarget> {
        self.weak.clone()
    }

    fn enter_active(&self, mut slot: AttemptSlot<'_>, resumed: bool) {
        let Some(attempt) = slot.as_mut() else {
            return;
        };
        if attempt.state != AttemptState::Connecting {
            log::debug!(
                "[Session] Ignoring {} while {:?}",
                if resumed { "resume" } else { "start" },
                attempt.state
            );
            return;
        }

        attempt.state = AttemptState::Active;
        let name = attempt.device.display_name.clone();
        if resumed {
            log::info!("[Session] Session resumed on {}", name);
            self.emitter.emit_status(StatusEvent::session_resumed(&name));
        } else {
            log::info!("[Session] Session started on {}", name);
            self.emitter.emit_status(StatusEvent::session_started(&name));
        }

        if attempt.load_attempted {
            return;
        }
        attempt.load_attempted = true;
        attempt.submission_in_flight = true;
        let request = self.sequencer.prepare(&name, &attempt.media);
        let id = attempt.id;
        drop(slot);

        self.submit_load(id, &name, request);
    }

    fn submit_load(&self, id: AttemptId, name: &str, request: LoadRequest) {
        let dispatched = self
            .sequencer
            .dispatch(&request, MediaListener::new(id, self.target()));

        let mut slot = self.attempt.lock();
        if !slot.as_ref().is_some_and(|attempt| attempt.id == id) {
            drop(slot);
            log::debug!("[Session] Attempt {} concluded during load submission", id);
            self.sequencer.release(id);
            return;
        }
        let Some(attempt) = slot.as_mut() else {
            return;
        };
        attempt.submission_in_flight = false;

        match dispatched {
            Ok(handle) => {
                self.sequencer.confirm_sent(name, handle);
                for signal in std::mem::take(&mut attempt.deferred_media) {
                    self.apply_media(attempt, signal);
                }
            }
            Err(error) => {
                attempt.deferred_media.clear();
                self.sequencer.report_failure(name, &error);
                attempt
                    .completion
                    .resolve(Err(CastError::MediaLoadFailed(error)));
            }
        }
    }

    fn apply_media(&self, attempt: &mut SessionAttempt, signal: MediaSignal) {
        let outcome = self.sequencer.interpret(
            &attempt.device.display_name,
            attempt.completion.is_resolved(),
            signal,
        );
        match outcome {
            MediaOutcome::Loaded => {
                attempt.completion.resolve(Ok(()));
            }
            MediaOutcome::Failed(error) => {
                attempt
                    .completion
                    .resolve(Err(CastError::MediaLoadFailed(error)));
            }
            MediaOutcome::Ignored => {}
        }
    }

    fn fail_start(&self, mut slot: AttemptSlot<'_>, error: SdkError) {
        let Some(attempt) = slot.as_mut() else {
            return;
        };
        // Ending without a load means the stop raced a still-connecting start.
        let connecting = attempt.state == AttemptState::Connecting
            || (attempt.state == AttemptState::Ending && !attempt.load_attempted);
        if !connecting {
            log::debug!(
                "[Session] Ignoring start failure while {:?}: {}",
                attempt.state,
                error
            );
            return;
        }

        attempt.state = AttemptState::Failed;
        let name = attempt.device.display_name.clone();
        log::warn!("[Session] Session start failed on {}: {}", name, error);
        self.emitter
            .emit_status(StatusEvent::session_start_failed(&name, &error.message));
        self.conclude(slot, Err(CastError::SessionStartFailed(error)));
    }

    fn finish(&self, mut slot: AttemptSlot<'_>, error: Option<SdkError>) {
        let Some(attempt) = slot.as_mut() else {
            return;
        };
        attempt.state = AttemptState::Ended;
        let name = attempt.device.display_name.clone();

        let result = match error {
            None => {
                log::info!("[Session] Session ended on {}", name);
                self.emitter.emit_status(StatusEvent::session_ended(&name));
                Ok(())
            }
            Some(error) => {
                log::warn!("[Session] Session ended with error on {}: {}", name, error);
                self.emitter
                    .emit_status(StatusEvent::session_ended_with_error(&name, &error.message));
                Err(CastError::SessionEnded(error))
            }
        };
        self.conclude(slot, result);
    }

    fn expire_stop(&self, id: AttemptId, timeout: Duration) {
        let mut slot = self.attempt.lock();
        let Some(attempt) = slot
            .as_mut()
            .filter(|attempt| attempt.id == id && attempt.state == AttemptState::Ending)
        else {
            return;
        };

        let timeout_ms = timeout.as_millis() as u64;
        attempt.state = AttemptState::Ended;
        let name = attempt.device.display_name.clone();
        log::warn!(
            "[Session] No end notification from {} after {}ms, concluding",
            name,
            timeout_ms
        );
        self.emitter.emit_status(StatusEvent::session_ended_with_error(
            &name,
            format!("end session timed out after {}ms", timeout_ms),
        ));
        self.conclude(slot, Err(CastError::EndTimedOut { timeout_ms }));
    }

    /// Removes the attempt, resolves whatever is still pending and detaches
    /// its listeners outside the lock.
    fn conclude(&self, mut slot: AttemptSlot<'_>, result: CastResult<()>) {
        let Some(mut attempt) = slot.take() else {
            return;
        };
        attempt.completion.resolve(result.clone());
        attempt.resolve_end_waiters(&result);
        drop(slot);

        self.sdk.detach_listener(attempt.id);
        if attempt.load_attempted {
            self.sequencer.release(attempt.id);
        }
        log::debug!("[Session] Attempt {} concluded", attempt.id);
    }
}

impl SignalTarget for Shared {
    fn on_session_signal(&self, attempt: AttemptId, signal: SessionSignal) {
        let slot = self.attempt.lock();
        if !slot.as_ref().is_some_and(|current| current.id == attempt) {
            log::debug!(
                "[Session] Dropping {:?} for stale attempt {}",
                signal,
                attempt
            );
            return;
        }

        match signal {
            SessionSignal::Started => self.enter_active(slot, false),
            SessionSignal::Resumed => self.enter_active(slot, true),
            SessionSignal::StartFailed(error) => self.fail_start(slot, error),
            SessionSignal::Ended(error) => self.finish(slot, error),
        }
    }

    fn on_media_signal(&self, attempt: AttemptId, signal: MediaSignal) {
        let mut slot = self.attempt.lock();
        let Some(current) = slot.as_mut().filter(|current| current.id == attempt) else {
            log::debug!(
                "[Session] Dropping {:?} for stale attempt {}",
                signal,
                attempt
            );
            return;
        };

        if current.submission_in_flight {
            log::trace!("[Session] Deferring media signal until the load is sent");
            current.deferred_media.push(signal);
            return;
        }
        self.apply_media(current, signal);
    }
}
