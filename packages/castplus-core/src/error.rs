//! Centralized error types for the Cast Plus core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Classifies every failure into an [`ErrorKind`] the caller can branch on
//! - Keeps SDK error text verbatim so it can be surfaced for diagnostics

use serde::Serialize;
use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::sdk::SdkError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::MdnsDaemon(_) => "mdns_daemon_failed",
            Self::Browse(_) => "mdns_browse_failed",
            Self::AlreadyAttached => "feed_already_attached",
            Self::MissingUniqueId(_) => "missing_unique_id",
        }
    }
}

/// Broad classification of a [`CastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Missing or invalid arguments, rejected before reaching the state machine.
    UserInput,
    /// The requested device is not in the registry.
    Lookup,
    /// The single-attempt invariant would be violated.
    Concurrency,
    /// The session SDK or media transport reported a failure.
    Transport,
    /// Invalid configuration.
    Configuration,
    /// The discovery subsystem failed.
    Discovery,
}

/// Application-wide error type for Cast Plus.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum CastError {
    /// Caller supplied a missing or malformed argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No device with this id is currently registered.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Another connect is still outstanding.
    #[error("A session is already in progress")]
    SessionAlreadyInProgress,

    /// The SDK could not start the session.
    #[error("Session start failed: {0}")]
    SessionStartFailed(SdkError),

    /// The session ended with an SDK-reported error.
    #[error("Session ended with error: {0}")]
    SessionEnded(SdkError),

    /// The media load request was rejected or failed.
    #[error("Media load failed: {0}")]
    MediaLoadFailed(SdkError),

    /// No ended notification arrived after a stop request.
    #[error("Session did not end within {timeout_ms}ms")]
    EndTimedOut {
        /// The configured stop timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The controller was dropped before the completion was resolved.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Discovery subsystem error.
    #[error("Discovery failed: {0}")]
    Discovery(String),
}

impl CastError {
    /// Returns a machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DeviceNotFound(_) => "device_not_found",
            Self::SessionAlreadyInProgress => "session_already_in_progress",
            Self::SessionStartFailed(_) => "session_start_failed",
            Self::SessionEnded(_) => "session_ended_with_error",
            Self::MediaLoadFailed(_) => "media_load_failed",
            Self::EndTimedOut { .. } => "end_timed_out",
            Self::Cancelled => "cancelled",
            Self::Configuration(_) => "configuration_error",
            Self::Discovery(_) => "discovery_failed",
        }
    }

    /// Returns the broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::UserInput,
            Self::DeviceNotFound(_) => ErrorKind::Lookup,
            Self::SessionAlreadyInProgress => ErrorKind::Concurrency,
            Self::SessionStartFailed(_)
            | Self::SessionEnded(_)
            | Self::MediaLoadFailed(_)
            | Self::EndTimedOut { .. }
            | Self::Cancelled => ErrorKind::Transport,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Discovery(_) => ErrorKind::Discovery,
        }
    }

    /// Returns the SDK error text carried by transport failures.
    pub fn sdk_detail(&self) -> Option<&str> {
        match self {
            Self::SessionStartFailed(e) | Self::SessionEnded(e) | Self::MediaLoadFailed(e) => {
                Some(e.message.as_str())
            }
            _ => None,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type CastResult<T> = Result<T, CastError>;

impl From<DiscoveryError> for CastError {
    fn from(err: DiscoveryError) -> Self {
        Self::Discovery(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_keep_sdk_text_verbatim() {
        let err = CastError::SessionStartFailed(SdkError::with_code("Receiver unavailable", 2005));
        assert_eq!(err.code(), "session_start_failed");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.sdk_detail(), Some("Receiver unavailable"));
        assert!(err.to_string().contains("Receiver unavailable"));
    }

    #[test]
    fn synchronous_errors_are_classified() {
        assert_eq!(
            CastError::InvalidArgument("url".into()).kind(),
            ErrorKind::UserInput
        );
        assert_eq!(
            CastError::DeviceNotFound("dev1".into()).kind(),
            ErrorKind::Lookup
        );
        assert_eq!(
            CastError::SessionAlreadyInProgress.kind(),
            ErrorKind::Concurrency
        );
        assert_eq!(CastError::DeviceNotFound("x".into()).sdk_detail(), None);
    }

    #[test]
    fn error_serializes_with_type_tag() {
        let json = serde_json::to_value(CastError::DeviceNotFound("dev1".into())).unwrap();
        assert_eq!(json["type"], "DeviceNotFound");
        assert_eq!(json["details"], "dev1");
    }

    #[test]
    fn discovery_error_maps_to_discovery_kind() {
        let err: CastError = DiscoveryError::MdnsDaemon("boom".into()).into();
        assert_eq!(err.kind(), ErrorKind::Discovery);
        assert_eq!(
            DiscoveryError::MdnsDaemon("boom".into()).code(),
            "mdns_daemon_failed"
        );
    }
}
