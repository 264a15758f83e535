//! Protocol and tuning constants shared across the crate.

use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Receiver Selection
// ─────────────────────────────────────────────────────────────────────────────

/// Application id of the stock default media receiver.
pub const DEFAULT_RECEIVER_APP_ID: &str = "CC1AD845";

// ─────────────────────────────────────────────────────────────────────────────
// Media Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Content type used when a media request does not override it.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Cast metadata type for generic movie metadata.
pub const CAST_METADATA_TYPE_MOVIE: u8 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// mDNS service type advertised by cast receivers (trailing dot required by mdns-sd).
pub const CAST_SERVICE_TYPE: &str = "_googlecast._tcp.local.";

/// mDNS service type advertised by mirroring receivers.
pub const MIRRORING_SERVICE_TYPE: &str = "_airplay._tcp.local.";

// ─────────────────────────────────────────────────────────────────────────────
// Session Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// Default time to wait for an ended notification after a stop request.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);
