//! Application services layer.
//!
//! This module contains the services that orchestrate between the caller and
//! the collaborators (discovery feeds, session SDK, media transport).

pub mod cast_service;
pub mod discovery_watcher;
pub mod media_sequencer;
pub mod session_controller;

pub use cast_service::CastService;
pub use discovery_watcher::DiscoveryWatcher;
pub use media_sequencer::MediaLoadSequencer;
pub use session_controller::SessionController;
