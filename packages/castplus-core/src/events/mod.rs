//! Event system for status and device-list notifications.
//!
//! This module provides:
//! - [`EventEmitter`] trait for domain services to emit events
//! - [`EventRelay`] delivering events to the single registered subscriber
//! - The two event families: [`StatusEvent`] and [`DeviceListEvent`]

mod emitter;
mod relay;

pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};
pub use relay::EventRelay;

use serde::Serialize;

use crate::discovery::DeviceSummary;
use crate::utils::now_millis;

/// Session and media status transitions, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatusEvent {
    /// A new session started on the receiver.
    #[serde(rename_all = "camelCase")]
    SessionStarted { device_name: String, timestamp: u64 },

    /// An existing session was resumed.
    #[serde(rename_all = "camelCase")]
    SessionResumed { device_name: String, timestamp: u64 },

    /// The session could not be started.
    #[serde(rename_all = "camelCase")]
    SessionStartFailed {
        device_name: String,
        /// SDK error text, verbatim.
        error: String,
        timestamp: u64,
    },

    /// The session ended normally.
    #[serde(rename_all = "camelCase")]
    SessionEnded { device_name: String, timestamp: u64 },

    /// The session ended with an error.
    #[serde(rename_all = "camelCase")]
    SessionEndedWithError {
        device_name: String,
        error: String,
        timestamp: u64,
    },

    /// A media load request is about to be submitted.
    #[serde(rename_all = "camelCase")]
    MediaLoading {
        device_name: String,
        title: String,
        timestamp: u64,
    },

    /// The media load request was handed to the transport.
    #[serde(rename_all = "camelCase")]
    MediaLoadRequestSent { device_name: String, timestamp: u64 },

    /// Playback reached the end of the media.
    #[serde(rename_all = "camelCase")]
    MediaFinished { device_name: String, timestamp: u64 },

    /// The media load failed.
    #[serde(rename_all = "camelCase")]
    MediaLoadFailed {
        device_name: String,
        error: String,
        timestamp: u64,
    },
}

/// Discriminant of a [`StatusEvent`], for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    SessionStarted,
    SessionResumed,
    SessionStartFailed,
    SessionEnded,
    SessionEndedWithError,
    MediaLoading,
    MediaLoadRequestSent,
    MediaFinished,
    MediaLoadFailed,
}

impl StatusEvent {
    pub fn session_started(device_name: &str) -> Self {
        Self::SessionStarted {
            device_name: device_name.to_string(),
            timestamp: now_millis(),
        }
    }

    pub fn session_resumed(device_name: &str) -> Self {
        Self::SessionResumed {
            device_name: device_name.to_string(),
            timestamp: now_millis(),
        }
    }

    pub fn session_start_failed(device_name: &str, error: impl Into<String>) -> Self {
        Self::SessionStartFailed {
            device_name: device_name.to_string(),
            error: error.into(),
            timestamp: now_millis(),
        }
    }

    pub fn session_ended(device_name: &str) -> Self {
        Self::SessionEnded {
            device_name: device_name.to_string(),
            timestamp: now_millis(),
        }
    }

    pub fn session_ended_with_error(device_name: &str, error: impl Into<String>) -> Self {
        Self::SessionEndedWithError {
            device_name: device_name.to_string(),
            error: error.into(),
            timestamp: now_millis(),
        }
    }

    pub fn media_loading(device_name: &str, title: &str) -> Self {
        Self::MediaLoading {
            device_name: device_name.to_string(),
            title: title.to_string(),
            timestamp: now_millis(),
        }
    }

    pub fn media_load_request_sent(device_name: &str) -> Self {
        Self::MediaLoadRequestSent {
            device_name: device_name.to_string(),
            timestamp: now_millis(),
        }
    }

    pub fn media_finished(device_name: &str) -> Self {
        Self::MediaFinished {
            device_name: device_name.to_string(),
            timestamp: now_millis(),
        }
    }

    pub fn media_load_failed(device_name: &str, error: impl Into<String>) -> Self {
        Self::MediaLoadFailed {
            device_name: device_name.to_string(),
            error: error.into(),
            timestamp: now_millis(),
        }
    }

    /// Returns the payload-free discriminant.
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::SessionStarted { .. } => StatusKind::SessionStarted,
            Self::SessionResumed { .. } => StatusKind::SessionResumed,
            Self::SessionStartFailed { .. } => StatusKind::SessionStartFailed,
            Self::SessionEnded { .. } => StatusKind::SessionEnded,
            Self::SessionEndedWithError { .. } => StatusKind::SessionEndedWithError,
            Self::MediaLoading { .. } => StatusKind::MediaLoading,
            Self::MediaLoadRequestSent { .. } => StatusKind::MediaLoadRequestSent,
            Self::MediaFinished { .. } => StatusKind::MediaFinished,
            Self::MediaLoadFailed { .. } => StatusKind::MediaLoadFailed,
        }
    }

    /// Name of the device the event concerns.
    pub fn device_name(&self) -> &str {
        match self {
            Self::SessionStarted { device_name, .. }
            | Self::SessionResumed { device_name, .. }
            | Self::SessionStartFailed { device_name, .. }
            | Self::SessionEnded { device_name, .. }
            | Self::SessionEndedWithError { device_name, .. }
            | Self::MediaLoading { device_name, .. }
            | Self::MediaLoadRequestSent { device_name, .. }
            | Self::MediaFinished { device_name, .. }
            | Self::MediaLoadFailed { device_name, .. } => device_name,
        }
    }

    /// Error description for failure events.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::SessionStartFailed { error, .. }
            | Self::SessionEndedWithError { error, .. }
            | Self::MediaLoadFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// The device list changed (or a subscriber just attached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListEvent {
    pub devices: Vec<DeviceSummary>,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl DeviceListEvent {
    pub fn new(devices: Vec<DeviceSummary>) -> Self {
        Self {
            devices,
            timestamp: now_millis(),
        }
    }
}
