//! mDNS/DNS-SD discovery feed for both transport families.
//!
//! Browses `_googlecast._tcp.local.` (cast receivers) or `_airplay._tcp.local.`
//! (mirroring receivers) and turns resolved/removed services into
//! [`DiscoveryNotification`]s.
//!
//! # Key Design Points
//!
//! - Identity comes from the receiver's advertised TXT id (`id` for cast,
//!   `deviceid` for mirroring). Records without one are skipped; host names
//!   and addresses are never used as ids.
//! - A fullname -> handle cache turns repeated resolutions into updates and
//!   lets removals (which only carry the fullname) report the removed handle.
//! - The pump task stops on shutdown through a cancellation token, and the
//!   daemon is shut down with it.

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use mdns_sd::{ResolvedService, ScopedIp, ServiceDaemon, ServiceEvent};
use tokio_util::sync::CancellationToken;

use super::types::{DiscoveryError, DiscoveryNotification, DiscoveryResult, NativeHandle, TransportFamily};
use crate::protocol_constants::{CAST_SERVICE_TYPE, MIRRORING_SERVICE_TYPE};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::sdk::{DiscoveryFeed, DiscoverySink};

/// Configuration for an mDNS discovery feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MdnsConfig {
    /// Transport family to browse for.
    pub family: TransportFamily,
}

impl MdnsConfig {
    pub fn new(family: TransportFamily) -> Self {
        Self { family }
    }

    /// Returns the DNS-SD service type browsed for this family.
    pub fn service_type(&self) -> &'static str {
        match self.family {
            TransportFamily::Cast => CAST_SERVICE_TYPE,
            TransportFamily::Mirroring => MIRRORING_SERVICE_TYPE,
        }
    }
}

/// Push-style discovery feed backed by an mDNS daemon.
pub struct MdnsDiscoveryFeed {
    config: MdnsConfig,
    daemon: ServiceDaemon,
    cache: Arc<DashMap<String, NativeHandle>>,
    cancel: CancellationToken,
    spawner: TokioSpawner,
    attached: AtomicBool,
    stopped: AtomicBool,
}

impl MdnsDiscoveryFeed {
    /// Creates a feed with its own mDNS daemon.
    ///
    /// The daemon spawns a background thread; browsing starts on `attach`.
    pub fn new(config: MdnsConfig, spawner: TokioSpawner) -> DiscoveryResult<Self> {
        let daemon = ServiceDaemon::new().map_err(|e| DiscoveryError::MdnsDaemon(e.to_string()))?;
        Ok(Self {
            config,
            daemon,
            cache: Arc::new(DashMap::new()),
            cancel: CancellationToken::new(),
            spawner,
            attached: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn family(&self) -> TransportFamily {
        self.config.family
    }
}

impl DiscoveryFeed for MdnsDiscoveryFeed {
    fn attach(&self, sink: DiscoverySink) -> DiscoveryResult<()> {
        if self.attached.swap(true, Ordering::SeqCst) {
            return Err(DiscoveryError::AlreadyAttached);
        }

        let service_type = self.config.service_type();
        let receiver = self
            .daemon
            .browse(service_type)
            .map_err(|e| DiscoveryError::Browse(e.to_string()))?;
        log::info!("[mDNS] Browsing for {}", service_type);

        let family = self.config.family;
        let cache = Arc::clone(&self.cache);
        let cancel = self.cancel.clone();

        self.spawner.spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::debug!("[mDNS] {} feed cancelled", family);
                        break;
                    }
                    event = receiver.recv_async() => match event {
                        Ok(event) => apply_event(family, &cache, &sink, event),
                        Err(e) => {
                            log::debug!("[mDNS] Receiver channel closed: {:?}", e);
                            break;
                        }
                    }
                }
            }
        });

        Ok(())
    }

    fn current_devices(&self) -> Vec<NativeHandle> {
        self.cache.iter().map(|entry| entry.value().clone()).collect()
    }

    fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();

        let service_type = self.config.service_type();
        if self.attached.load(Ordering::SeqCst) {
            if let Err(e) = self.daemon.stop_browse(service_type) {
                log::warn!("[mDNS] Failed to stop browse: {:?}", e);
            }
        }
        if let Err(e) = self.daemon.shutdown() {
            log::warn!("[mDNS] Failed to shut down daemon: {:?}", e);
        }
        log::info!("[mDNS] Stopped browsing for {}", service_type);
    }
}

/// Maps one daemon event onto the cache and the sink.
fn apply_event(
    family: TransportFamily,
    cache: &DashMap<String, NativeHandle>,
    sink: &DiscoverySink,
    event: ServiceEvent,
) {
    match event {
        ServiceEvent::ServiceResolved(info) => {
            let Some(handle) = native_from_resolved(family, &info) else {
                log::debug!("[mDNS] Skipping {}: no stable device id", info.fullname);
                return;
            };
            let is_new = cache
                .insert(info.fullname.clone(), handle.clone())
                .is_none();
            log::trace!("[mDNS] Resolved {} -> {}", info.fullname, handle.unique_id);
            sink.notify(if is_new {
                DiscoveryNotification::Added(handle)
            } else {
                DiscoveryNotification::Updated(handle)
            });
        }
        ServiceEvent::ServiceRemoved(_, fullname) => {
            if let Some((_, handle)) = cache.remove(&fullname) {
                sink.notify(DiscoveryNotification::Removed(handle));
            }
        }
        other => log::trace!("[mDNS] {:?}", other),
    }
}

fn native_from_resolved(family: TransportFamily, info: &ResolvedService) -> Option<NativeHandle> {
    // Prefer IPv4 for control connections.
    let address = info
        .addresses
        .iter()
        .map(ScopedIp::to_ip_addr)
        .min_by_key(IpAddr::is_ipv6)
        .map(|ip| SocketAddr::new(ip, info.port));

    native_from_record(family, &info.fullname, address, |key| {
        info.txt_properties.get_property_val_str(key)
    })
}

/// Builds a handle from a resolved record's fields and TXT lookup.
///
/// Returns `None` if the record carries no stable device id.
fn native_from_record<'a>(
    family: TransportFamily,
    fullname: &str,
    address: Option<SocketAddr>,
    txt: impl Fn(&str) -> Option<&'a str>,
) -> Option<NativeHandle> {
    let non_empty = |key: &str| {
        txt(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let (id_key, model_key) = match family {
        TransportFamily::Cast => ("id", "md"),
        TransportFamily::Mirroring => ("deviceid", "model"),
    };
    let unique_id = non_empty(id_key)?;

    let instance = instance_name(fullname);
    let friendly_name = match family {
        TransportFamily::Cast => non_empty("fn").unwrap_or(instance),
        TransportFamily::Mirroring => instance,
    };

    let mut handle = NativeHandle::new(unique_id, friendly_name, family);
    handle.address = address;
    handle.model = non_empty(model_key);
    Some(handle)
}

/// Extracts the service instance name from a DNS-SD fullname.
///
/// `Living Room TV._airplay._tcp.local.` -> `Living Room TV`
fn instance_name(fullname: &str) -> String {
    let name = fullname
        .find("._")
        .map_or(fullname, |end| &fullname[..end]);
    name.replace("\\032", " ").replace('\\', "")
}
