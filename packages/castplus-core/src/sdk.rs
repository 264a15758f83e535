//! Collaborator boundary: session SDK, media transport and discovery feed.
//!
//! Vendor SDKs expose wide listener interfaces with many optional callbacks.
//! Here each collaborator gets a closed signal enum and a single listener
//! handle with one `deliver` method; adapters translate every vendor callback
//! into one variant constructor and hand it over.
//!
//! All calls on these traits must return promptly. Results arrive later
//! through the listener handles, on whatever thread the SDK uses.

use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::discovery::{DiscoveryNotification, DiscoveryResult, NativeHandle};
use crate::media::LoadRequest;
use crate::services::DiscoveryWatcher;
use crate::session::AttemptId;

/// Error reported by a session SDK or media transport.
///
/// The message is kept verbatim so callers can surface it for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct SdkError {
    /// SDK error description.
    pub message: String,
    /// SDK status code, when the SDK provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

impl SdkError {
    /// Creates an error with just a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Creates an error with a description and SDK status code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Signals
// ─────────────────────────────────────────────────────────────────────────────

/// Session lifecycle notifications from the session SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A new session started on the receiver.
    Started,
    /// An existing session was resumed.
    Resumed,
    /// The session could not be started.
    StartFailed(SdkError),
    /// The session ended, with an error if it ended abnormally.
    Ended(Option<SdkError>),
}

/// Receiver player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Buffering,
    Playing,
    Paused,
}

/// Why the player went idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    Finished,
    Cancelled,
    Interrupted,
    Error,
}

/// Media status snapshot reported by the receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaStatus {
    pub player_state: PlayerState,
    pub idle_reason: Option<IdleReason>,
    /// Playback position in seconds.
    pub current_time: f64,
}

impl MediaStatus {
    /// Creates a status with no position information.
    pub fn new(player_state: PlayerState, idle_reason: Option<IdleReason>) -> Self {
        Self {
            player_state,
            idle_reason,
            current_time: 0.0,
        }
    }

    /// Returns true if playback reached the end of the media.
    pub fn is_finished(&self) -> bool {
        self.player_state == PlayerState::Idle && self.idle_reason == Some(IdleReason::Finished)
    }

    /// Returns true if the player went idle because of an error.
    pub fn is_error(&self) -> bool {
        self.player_state == PlayerState::Idle && self.idle_reason == Some(IdleReason::Error)
    }

    /// Parses a Cast media-namespace `MEDIA_STATUS` message.
    ///
    /// Returns `None` for other message types or an empty status list.
    pub fn from_cast_payload(payload: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(payload).ok()?;
        if value.get("type").and_then(Value::as_str) != Some("MEDIA_STATUS") {
            return None;
        }
        let status = value.get("status")?.as_array()?.first()?;

        let player_state = match status.get("playerState").and_then(Value::as_str)? {
            "IDLE" => PlayerState::Idle,
            "BUFFERING" | "LOADING" => PlayerState::Buffering,
            "PLAYING" => PlayerState::Playing,
            "PAUSED" => PlayerState::Paused,
            _ => return None,
        };
        let idle_reason = status
            .get("idleReason")
            .and_then(Value::as_str)
            .and_then(|reason| match reason {
                "FINISHED" => Some(IdleReason::Finished),
                "CANCELLED" => Some(IdleReason::Cancelled),
                "INTERRUPTED" => Some(IdleReason::Interrupted),
                "ERROR" => Some(IdleReason::Error),
                _ => None,
            });

        Some(Self {
            player_state,
            idle_reason,
            current_time: status
                .get("currentTime")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
        })
    }
}

/// Media request and status notifications from the media transport.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSignal {
    /// The load request completed successfully.
    RequestCompleted,
    /// The load request failed.
    RequestFailed(SdkError),
    /// The receiver reported a new media status.
    StatusChanged(MediaStatus),
}

/// Opaque handle for a submitted load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(pub u64);

// ─────────────────────────────────────────────────────────────────────────────
// Listener Handles
// ─────────────────────────────────────────────────────────────────────────────

/// Dispatch target behind the listener handles.
pub(crate) trait SignalTarget: Send + Sync {
    fn on_session_signal(&self, attempt: AttemptId, signal: SessionSignal);
    fn on_media_signal(&self, attempt: AttemptId, signal: MediaSignal);
}

/// Listener handle attached to the session SDK for one session attempt.
///
/// Holds only a weak reference to the controller; delivering to a dropped
/// controller is a no-op.
#[derive(Clone)]
pub struct SessionListener {
    attempt: AttemptId,
    target: Weak<dyn SignalTarget>,
}

impl SessionListener {
    pub(crate) fn new(attempt: AttemptId, target: Weak<dyn SignalTarget>) -> Self {
        Self { attempt, target }
    }

    /// The attempt this listener belongs to.
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Delivers a session signal to the controller.
    pub fn deliver(&self, signal: SessionSignal) {
        if let Some(target) = self.target.upgrade() {
            target.on_session_signal(self.attempt, signal);
        }
    }
}

impl std::fmt::Debug for SessionListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionListener")
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// Listener handle passed with a media load for one session attempt.
#[derive(Clone)]
pub struct MediaListener {
    attempt: AttemptId,
    target: Weak<dyn SignalTarget>,
}

impl MediaListener {
    pub(crate) fn new(attempt: AttemptId, target: Weak<dyn SignalTarget>) -> Self {
        Self { attempt, target }
    }

    /// The attempt this listener belongs to.
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Delivers a media signal to the controller.
    pub fn deliver(&self, signal: MediaSignal) {
        if let Some(target) = self.target.upgrade() {
            target.on_media_signal(self.attempt, signal);
        }
    }
}

impl std::fmt::Debug for MediaListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaListener")
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// Sink a discovery feed pushes notifications into.
#[derive(Clone)]
pub struct DiscoverySink {
    watcher: Weak<DiscoveryWatcher>,
}

impl DiscoverySink {
    pub(crate) fn new(watcher: &Arc<DiscoveryWatcher>) -> Self {
        Self {
            watcher: Arc::downgrade(watcher),
        }
    }

    /// Delivers one notification to the discovery watcher.
    pub fn notify(&self, notification: DiscoveryNotification) {
        if let Some(watcher) = self.watcher.upgrade() {
            watcher.handle(notification);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Session management half of a vendor SDK.
pub trait SessionSdk: Send + Sync {
    /// Attaches the listener for a session attempt.
    fn attach_listener(&self, listener: SessionListener);

    /// Detaches the listener of a session attempt. No-op if unknown.
    fn detach_listener(&self, attempt: AttemptId);

    /// Requests a session on the given receiver.
    ///
    /// An `Err` means the request was rejected outright; it is handled exactly
    /// like a later `StartFailed` signal.
    fn start_session(&self, device: &NativeHandle) -> Result<(), SdkError>;

    /// Requests the current session to end.
    fn end_session(&self) -> Result<(), SdkError>;
}

/// Media control half of a vendor SDK.
pub trait MediaTransport: Send + Sync {
    /// Submits a load request on the current session.
    ///
    /// Completion and status notifications are delivered to `listener`.
    fn load_media(
        &self,
        request: &LoadRequest,
        listener: MediaListener,
    ) -> Result<RequestHandle, SdkError>;

    /// Drops the media listener of a session attempt. No-op if unknown.
    fn release_listener(&self, attempt: AttemptId);
}

/// Push-style discovery feed.
pub trait DiscoveryFeed: Send + Sync {
    /// Starts delivering add/update/remove notifications to `sink`.
    fn attach(&self, sink: DiscoverySink) -> DiscoveryResult<()>;

    /// Returns the devices the feed currently knows about.
    fn current_devices(&self) -> Vec<NativeHandle>;

    /// Stops the feed. Safe to call more than once.
    fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_error_displays_message_verbatim() {
        let err = SdkError::with_code("Receiver app not found", 2005);
        assert_eq!(err.to_string(), "Receiver app not found");
        assert_eq!(err.code, Some(2005));
    }

    #[test]
    fn parses_finished_media_status() {
        let payload = r#"{"type":"MEDIA_STATUS","requestId":0,"status":[
            {"playerState":"IDLE","idleReason":"FINISHED","currentTime":42.5}
        ]}"#;
        let status = MediaStatus::from_cast_payload(payload).unwrap();
        assert!(status.is_finished());
        assert!(!status.is_error());
        assert_eq!(status.current_time, 42.5);
    }

    #[test]
    fn parses_playing_media_status() {
        let payload = r#"{"type":"MEDIA_STATUS","status":[{"playerState":"PLAYING"}]}"#;
        let status = MediaStatus::from_cast_payload(payload).unwrap();
        assert_eq!(status.player_state, PlayerState::Playing);
        assert_eq!(status.idle_reason, None);
    }

    #[test]
    fn ignores_other_messages_and_empty_status() {
        assert!(MediaStatus::from_cast_payload(r#"{"type":"PONG"}"#).is_none());
        assert!(MediaStatus::from_cast_payload(r#"{"type":"MEDIA_STATUS","status":[]}"#).is_none());
        assert!(MediaStatus::from_cast_payload("not json").is_none());
    }

    #[test]
    fn listener_with_dropped_target_is_inert() {
        struct Target;
        impl SignalTarget for Target {
            fn on_session_signal(&self, _: AttemptId, _: SessionSignal) {
                panic!("should not be delivered");
            }
            fn on_media_signal(&self, _: AttemptId, _: MediaSignal) {
                panic!("should not be delivered");
            }
        }

        let target: Arc<dyn SignalTarget> = Arc::new(Target);
        let listener = SessionListener::new(AttemptId::new(), Arc::downgrade(&target));
        drop(target);
        listener.deliver(SessionSignal::Started);
    }
}
