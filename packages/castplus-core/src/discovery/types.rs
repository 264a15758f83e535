//! Shared types for receiver discovery.
//!
//! A [`NativeHandle`] is whatever the discovery feed hands us; a [`Device`] is
//! the normalized registry entry built from it. Device identity always comes
//! from the feed's stable unique id, never from addresses or hashes, so an id
//! looked up later resolves to the same physical receiver.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport family a receiver is reachable through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportFamily {
    /// Local-network receiver-discovery casting.
    Cast,
    /// Device-to-device mirroring.
    Mirroring,
}

impl std::fmt::Display for TransportFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cast => write!(f, "cast"),
            Self::Mirroring => write!(f, "mirroring"),
        }
    }
}

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// mDNS daemon error.
    #[error("mDNS daemon error: {0}")]
    MdnsDaemon(String),

    /// Browsing for a service type failed.
    #[error("mDNS browse failed: {0}")]
    Browse(String),

    /// The feed already delivers to a sink.
    #[error("discovery feed is already attached")]
    AlreadyAttached,

    /// The feed reported a device without a stable unique id.
    #[error("device has no stable unique id: {0}")]
    MissingUniqueId(String),
}

/// Convenient Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// External reference to a receiver as reported by a discovery feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeHandle {
    /// Stable unique id assigned by the receiver or its SDK.
    pub unique_id: String,
    /// Human-readable name as advertised.
    pub friendly_name: String,
    /// Transport family the handle belongs to.
    pub family: TransportFamily,
    /// Control address, when the feed resolves one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<SocketAddr>,
    /// Model name (e.g., "Chromecast Ultra").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Receiver applications the device advertises. Empty when unknown.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub receiver_apps: Vec<String>,
}

impl NativeHandle {
    /// Creates a handle with just an id, name and family.
    pub fn new(
        unique_id: impl Into<String>,
        friendly_name: impl Into<String>,
        family: TransportFamily,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            friendly_name: friendly_name.into(),
            family,
            address: None,
            model: None,
            receiver_apps: Vec::new(),
        }
    }

    /// Returns the normalized registry id for this handle.
    pub fn device_id(&self) -> DiscoveryResult<String> {
        let id = self.unique_id.trim();
        if id.is_empty() {
            return Err(DiscoveryError::MissingUniqueId(self.friendly_name.clone()));
        }
        Ok(id.to_string())
    }
}

/// A discovered receiver tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Stable registry id derived from the handle's unique id.
    pub id: String,
    /// Name to show to the user.
    pub display_name: String,
    /// The handle used to talk to the session SDK.
    pub handle: NativeHandle,
}

impl Device {
    /// Builds a registry entry from a native handle.
    ///
    /// The display name falls back to the model and then the id when the
    /// receiver advertises no friendly name.
    pub fn from_native(handle: NativeHandle) -> DiscoveryResult<Self> {
        let id = handle.device_id()?;
        let display_name = [Some(handle.friendly_name.as_str()), handle.model.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .unwrap_or(id.as_str())
            .to_string();
        Ok(Self {
            id,
            display_name,
            handle,
        })
    }

    /// Returns the caller-facing summary of this device.
    #[must_use]
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            device_id: self.id.clone(),
            device_name: self.display_name.clone(),
            device_unique_id: self.handle.unique_id.clone(),
        }
    }
}

/// Caller-facing view of a device, as returned by `listDevices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    /// Registry id, used to connect.
    pub device_id: String,
    /// Display name.
    pub device_name: String,
    /// SDK-stable unique id.
    pub device_unique_id: String,
}

/// A single push notification from a discovery feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryNotification {
    /// A receiver appeared.
    Added(NativeHandle),
    /// A known receiver changed (name, address, apps).
    Updated(NativeHandle),
    /// A receiver is gone.
    Removed(NativeHandle),
}

impl DiscoveryNotification {
    /// Returns the handle carried by the notification.
    pub fn handle(&self) -> &NativeHandle {
        match self {
            Self::Added(h) | Self::Updated(h) | Self::Removed(h) => h,
        }
    }
}

/// Receiver-application selector supplied once at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverSelector {
    app_id: String,
}

impl ReceiverSelector {
    /// Creates a selector for the given receiver application id.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    /// Returns the receiver application id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns true if the handle can run the selected receiver application.
    ///
    /// Devices that do not advertise an application list are assumed to match;
    /// the session SDK has the final word when the session starts.
    pub fn matches(&self, handle: &NativeHandle) -> bool {
        handle.receiver_apps.is_empty()
            || handle
                .receiver_apps
                .iter()
                .any(|app| app.eq_ignore_ascii_case(&self.app_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_comes_from_unique_id() {
        let handle = NativeHandle::new(" dev1 ", "Living Room TV", TransportFamily::Cast);
        let device = Device::from_native(handle).unwrap();
        assert_eq!(device.id, "dev1");
        assert_eq!(device.display_name, "Living Room TV");
    }

    #[test]
    fn blank_unique_id_is_rejected() {
        let handle = NativeHandle::new("", "Kitchen", TransportFamily::Cast);
        assert!(matches!(
            Device::from_native(handle),
            Err(DiscoveryError::MissingUniqueId(name)) if name == "Kitchen"
        ));
    }

    #[test]
    fn display_name_falls_back_to_model_then_id() {
        let mut handle = NativeHandle::new("abc", "  ", TransportFamily::Mirroring);
        handle.model = Some("AppleTV6,2".to_string());
        assert_eq!(Device::from_native(handle.clone()).unwrap().display_name, "AppleTV6,2");

        handle.model = None;
        assert_eq!(Device::from_native(handle).unwrap().display_name, "abc");
    }

    #[test]
    fn summary_serializes_camel_case() {
        let device =
            Device::from_native(NativeHandle::new("dev1", "Living Room TV", TransportFamily::Cast))
                .unwrap();
        let json = serde_json::to_value(device.summary()).unwrap();
        assert_eq!(json["deviceId"], "dev1");
        assert_eq!(json["deviceName"], "Living Room TV");
        assert_eq!(json["deviceUniqueId"], "dev1");
    }

    #[test]
    fn selector_matches_unknown_or_listed_apps() {
        let selector = ReceiverSelector::new("CC1AD845");
        let mut handle = NativeHandle::new("dev1", "TV", TransportFamily::Cast);
        assert!(selector.matches(&handle));

        handle.receiver_apps = vec!["cc1ad845".to_string()];
        assert!(selector.matches(&handle));

        handle.receiver_apps = vec!["OTHERAPP".to_string()];
        assert!(!selector.matches(&handle));
    }
}
