//! Registry of currently discovered receivers.
//!
//! Written only by the discovery watcher, read by everything else. Readers
//! always get copies, so a discovery callback mutating the registry can never
//! invalidate a caller's view.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::types::{Device, DeviceSummary};

#[derive(Debug, Default)]
struct RegistryInner {
    devices: HashMap<String, Device>,
    /// Ids in first-discovery order.
    order: Vec<String>,
}

/// Device id -> [`Device`] mapping with copy-on-read snapshots.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    inner: RwLock<RegistryInner>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a device by id.
    ///
    /// Returns `true` if the device was not registered before. A replaced
    /// device keeps its original position in the snapshot order.
    pub fn upsert(&self, device: Device) -> bool {
        let mut inner = self.inner.write();
        let id = device.id.clone();
        let is_new = inner.devices.insert(id.clone(), device).is_none();
        if is_new {
            inner.order.push(id);
        }
        is_new
    }

    /// Removes a device by id. No-op if absent.
    pub fn remove(&self, id: &str) -> Option<Device> {
        let mut inner = self.inner.write();
        let removed = inner.devices.remove(id);
        if removed.is_some() {
            inner.order.retain(|known| known != id);
        }
        removed
    }

    /// Looks up a device by id, returning a copy.
    pub fn lookup(&self, id: &str) -> Option<Device> {
        self.inner.read().devices.get(id).cloned()
    }

    /// Returns a point-in-time copy of all devices in discovery order.
    pub fn snapshot(&self) -> Vec<Device> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.devices.get(id).cloned())
            .collect()
    }

    /// Returns caller-facing summaries in discovery order.
    pub fn summaries(&self) -> Vec<DeviceSummary> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.devices.get(id).map(Device::summary))
            .collect()
    }

    /// Replaces the registry content with `devices`.
    ///
    /// Devices already registered keep their position; new ones are appended
    /// in the given order.
    pub fn replace_all(&self, devices: Vec<Device>) {
        let mut inner = self.inner.write();
        let incoming: Vec<String> = devices.iter().map(|device| device.id.clone()).collect();
        let next: HashMap<String, Device> = devices
            .into_iter()
            .map(|device| (device.id.clone(), device))
            .collect();

        let mut order: Vec<String> = inner
            .order
            .iter()
            .filter(|id| next.contains_key(id.as_str()))
            .cloned()
            .collect();
        for id in incoming {
            if !order.contains(&id) {
                order.push(id);
            }
        }

        inner.devices = next;
        inner.order = order;
    }

    /// Returns the number of registered devices.
    pub fn len(&self) -> usize {
        self.inner.read().devices.len()
    }

    /// Returns true if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::types::{NativeHandle, TransportFamily};

    fn device(id: &str, name: &str) -> Device {
        Device::from_native(NativeHandle::new(id, name, TransportFamily::Cast)).unwrap()
    }

    #[test]
    fn upsert_is_idempotent() {
        let registry = DeviceRegistry::new();
        assert!(registry.upsert(device("dev1", "Living Room TV")));
        assert!(!registry.upsert(device("dev1", "Living Room TV")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn upsert_replaces_but_keeps_position() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("dev1", "Living Room TV"));
        registry.upsert(device("dev2", "Kitchen"));
        registry.upsert(device("dev1", "Den TV"));

        let names: Vec<_> = registry
            .snapshot()
            .into_iter()
            .map(|d| d.display_name)
            .collect();
        assert_eq!(names, vec!["Den TV", "Kitchen"]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("dev1", "Living Room TV"));
        assert!(registry.remove("nope").is_none());
        assert!(registry.remove("dev1").is_some());
        assert!(registry.remove("dev1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn lookup_returns_copy() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("dev1", "Living Room TV"));
        let found = registry.lookup("dev1").unwrap();
        registry.remove("dev1");
        assert_eq!(found.display_name, "Living Room TV");
        assert!(registry.lookup("dev1").is_none());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("dev1", "A"));
        let snapshot = registry.snapshot();
        registry.upsert(device("dev2", "B"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn interleaved_notifications_leave_only_live_devices() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("a", "A"));
        registry.upsert(device("b", "B"));
        registry.remove("a");
        registry.upsert(device("c", "C"));
        registry.upsert(device("b", "B2"));
        registry.remove("zzz");
        registry.upsert(device("a", "A"));
        registry.remove("c");

        let ids: Vec<_> = registry.summaries().into_iter().map(|s| s.device_id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn replace_all_keeps_known_order_and_drops_missing() {
        let registry = DeviceRegistry::new();
        registry.upsert(device("b", "B"));
        registry.upsert(device("a", "A"));
        registry.upsert(device("gone", "Gone"));

        registry.replace_all(vec![
            device("a", "A"),
            device("d", "D"),
            device("b", "B"),
            device("c", "C"),
        ]);

        let ids: Vec<_> = registry.summaries().into_iter().map(|s| s.device_id).collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);
    }
}
