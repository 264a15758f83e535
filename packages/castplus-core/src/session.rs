//! Session attempts and their single-resolution completions.
//!
//! At most one [`SessionAttempt`] exists at a time. It is created by a
//! connect request and destroyed once it reaches `Ended` or `Failed` with its
//! completion resolved.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::discovery::Device;
use crate::error::{CastError, CastResult};
use crate::media::MediaRequest;
use crate::sdk::MediaSignal;
use crate::utils::require_non_empty;

/// Identifies one session attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Generates a fresh attempt id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Connecting,
    Active,
    Ending,
    Failed,
    Ended,
}

/// Controller-level session state, as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No attempt exists.
    #[default]
    Idle,
    Connecting,
    Active,
    Ending,
}

impl From<AttemptState> for SessionState {
    fn from(state: AttemptState) -> Self {
        match state {
            AttemptState::Connecting => Self::Connecting,
            AttemptState::Active => Self::Active,
            AttemptState::Ending => Self::Ending,
            AttemptState::Failed | AttemptState::Ended => Self::Idle,
        }
    }
}

/// Arguments of a connect call.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub device_id: String,
    /// When present, must match the device's unique id or the lookup fails.
    pub device_unique_id: Option<String>,
    pub media: MediaRequest,
}

impl ConnectRequest {
    pub fn new(device_id: impl Into<String>, media: MediaRequest) -> Self {
        Self {
            device_id: device_id.into(),
            device_unique_id: None,
            media,
        }
    }

    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.device_unique_id = Some(unique_id.into());
        self
    }

    /// Rejects missing or malformed arguments.
    pub fn validate(&self) -> CastResult<()> {
        require_non_empty("deviceId", &self.device_id)?;
        self.media.validate()
    }
}

/// Single-resolution result of an asynchronous operation.
///
/// Resolves with `Err(CastError::Cancelled)` if the controller is dropped
/// before resolving it.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<CastResult<()>>,
}

impl Completion {
    pub(crate) fn channel() -> (CompletionSlot, Self) {
        let (tx, rx) = oneshot::channel();
        (CompletionSlot { tx: Some(tx) }, Self { rx })
    }

    /// Returns the result if it is already available.
    pub fn try_result(&mut self) -> Option<CastResult<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CastError::Cancelled)),
        }
    }
}

impl Future for Completion {
    type Output = CastResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(CastError::Cancelled)))
    }
}

/// Sending half of a [`Completion`]. Resolves at most once.
#[derive(Debug)]
pub(crate) struct CompletionSlot {
    tx: Option<oneshot::Sender<CastResult<()>>>,
}

impl CompletionSlot {
    /// Resolves the slot. Returns `false` if it was already resolved.
    pub fn resolve(&mut self, result: CastResult<()>) -> bool {
        match self.tx.take() {
            Some(tx) => {
                // Receiver may have been dropped by an uninterested caller.
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.is_none()
    }
}

/// State of the one in-flight connection attempt.
#[derive(Debug)]
pub(crate) struct SessionAttempt {
    pub id: AttemptId,
    /// Copy of the registry entry taken at connect time.
    pub device: Device,
    pub media: MediaRequest,
    pub state: AttemptState,
    /// Flips to true exactly once, when the media load is submitted.
    pub load_attempted: bool,
    /// True while `load_media` is being called outside the lock.
    pub submission_in_flight: bool,
    /// Media signals that arrived during submission, replayed afterwards.
    pub deferred_media: Vec<MediaSignal>,
    pub completion: CompletionSlot,
    pub end_waiters: Vec<CompletionSlot>,
}

impl SessionAttempt {
    pub fn new(device: Device, media: MediaRequest) -> (Self, Completion) {
        let (slot, completion) = Completion::channel();
        let attempt = Self {
            id: AttemptId::new(),
            device,
            media,
            state: AttemptState::Connecting,
            load_attempted: false,
            submission_in_flight: false,
            deferred_media: Vec::new(),
            completion: slot,
            end_waiters: Vec::new(),
        };
        (attempt, completion)
    }

    /// Registers an extra slot resolved when the attempt ends.
    pub fn wait_for_end(&mut self) -> Completion {
        let (slot, completion) = Completion::channel();
        self.end_waiters.push(slot);
        completion
    }

    /// Resolves every end waiter with clones of `result`.
    pub fn resolve_end_waiters(&mut self, result: &CastResult<()>) {
        for mut waiter in self.end_waiters.drain(..) {
            waiter.resolve(result.clone());
        }
    }
}
