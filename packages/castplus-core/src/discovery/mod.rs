//! Receiver discovery.
//!
//! # Module Structure
//!
//! - `types` - Device identity, native handles and discovery notifications
//! - `registry` - The [`DeviceRegistry`] of currently discovered devices
//! - `mdns` - mDNS/DNS-SD discovery feed for both transport families

pub mod mdns;
pub mod registry;
pub mod types;

pub use mdns::{MdnsConfig, MdnsDiscoveryFeed};
pub use registry::DeviceRegistry;
pub use types::{
    Device, DeviceSummary, DiscoveryError, DiscoveryNotification, DiscoveryResult, NativeHandle,
    ReceiverSelector, TransportFamily,
};
