//! Core configuration types.
//!
//! [`Config`] is supplied once at bootstrap. The receiver-application selector
//! and media defaults derived from it are never re-read per call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::ReceiverSelector;
use crate::error::{CastError, CastResult};
use crate::media::StreamType;
use crate::protocol_constants::{
    DEFAULT_CONTENT_TYPE, DEFAULT_RECEIVER_APP_ID, DEFAULT_STOP_TIMEOUT,
};

/// Defaults applied to every media load request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MediaDefaults {
    /// Content type used when a request does not override it.
    pub content_type: String,
    /// Stream type sent with every load.
    pub stream_type: StreamType,
}

impl Default for MediaDefaults {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            stream_type: StreamType::Buffered,
        }
    }
}

/// Configuration for the Cast Plus core.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Receiver application id used to select matching devices.
    pub receiver_app_id: String,

    /// Media load defaults.
    pub media: MediaDefaults,

    /// Time to wait for the ended notification after a stop request
    /// (milliseconds, 0 = wait indefinitely).
    pub stop_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            receiver_app_id: DEFAULT_RECEIVER_APP_ID.to_string(),
            media: MediaDefaults::default(),
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> CastResult<()> {
        if self.receiver_app_id.trim().is_empty() {
            return Err(CastError::Configuration(
                "receiver_app_id must not be empty".to_string(),
            ));
        }
        if self.media.content_type.trim().is_empty() {
            return Err(CastError::Configuration(
                "media.content_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the receiver selector derived from this configuration.
    #[must_use]
    pub fn selector(&self) -> ReceiverSelector {
        ReceiverSelector::new(self.receiver_app_id.trim())
    }

    /// Returns the stop timeout, or `None` when disabled.
    #[must_use]
    pub fn stop_timeout(&self) -> Option<Duration> {
        (self.stop_timeout_ms > 0).then(|| Duration::from_millis(self.stop_timeout_ms))
    }
}
