//! General utilities shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use crate::error::{CastError, CastResult};

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Validates a media URL before it reaches the session state machine.
///
/// Receivers fetch media themselves, so only absolute `http`/`https` URLs
/// with a host are accepted.
pub fn validate_media_url(url: &str) -> CastResult<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CastError::InvalidArgument("url is required".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|e| CastError::InvalidArgument(format!("invalid url '{}': {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CastError::InvalidArgument(format!(
            "url must be http or https: {}",
            url
        )));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(CastError::InvalidArgument(format!(
            "url has no host: {}",
            url
        )));
    }

    Ok(())
}

/// Validates that a required string argument is present.
pub fn require_non_empty(field: &str, value: &str) -> CastResult<()> {
    if value.trim().is_empty() {
        return Err(CastError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(())
}
