//! Cast Plus Core - receiver discovery and remote playback orchestration.
//!
//! This crate lets a host application discover nearby media receivers, open a
//! remote playback session on one of them, push a media URL with metadata and
//! observe the session through an ordered status stream. The same contract is
//! served for both transport families (receiver-discovery casting and
//! device-to-device mirroring); only the collaborator adapters differ.
//!
//! # Architecture
//!
//! - [`discovery`]: Device identity, the [`DeviceRegistry`] and the mDNS feeds
//! - [`sdk`]: Collaborator traits and the closed signal types they deliver
//! - [`media`]: Media requests and load request construction
//! - [`session`]: Session attempts and single-resolution completions
//! - [`services`]: Discovery watcher, session controller, load sequencer and
//!   the [`CastService`] facade
//! - [`events`]: Status and device-list events plus the single-subscriber relay
//! - [`bootstrap`]: Composition root
//!
//! # Abstraction Traits
//!
//! - [`SessionSdk`](sdk::SessionSdk): Starting and ending sessions
//! - [`MediaTransport`](sdk::MediaTransport): Submitting media loads
//! - [`DiscoveryFeed`](sdk::DiscoveryFeed): Push-style device discovery
//! - [`EventEmitter`](events::EventEmitter): Emitting domain events

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod media;
pub mod protocol_constants;
pub mod runtime;
pub mod sdk;
pub mod services;
pub mod session;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use bootstrap::{bootstrap_cast_service, Collaborators};
pub use config::{Config, MediaDefaults};
pub use discovery::{
    Device, DeviceRegistry, DeviceSummary, DiscoveryError, DiscoveryNotification,
    MdnsDiscoveryFeed, NativeHandle, ReceiverSelector, TransportFamily,
};
pub use error::{CastError, CastResult, ErrorCode, ErrorKind};
pub use events::{
    DeviceListEvent, EventEmitter, EventRelay, LoggingEventEmitter, NoopEventEmitter, StatusEvent,
    StatusKind,
};
pub use media::{LoadRequest, MediaMetadata, MediaRequest, StreamType};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use sdk::{
    DiscoveryFeed, DiscoverySink, IdleReason, MediaListener, MediaSignal, MediaStatus,
    MediaTransport, PlayerState, RequestHandle, SdkError, SessionListener, SessionSdk,
    SessionSignal,
};
pub use services::{CastService, DiscoveryWatcher, MediaLoadSequencer, SessionController};
pub use session::{AttemptId, Completion, ConnectRequest, SessionState};
pub use utils::now_millis;
