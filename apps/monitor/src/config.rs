//! Monitor configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use castplus_core::TransportFamily;
use serde::Deserialize;

/// Monitor configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Receiver application devices must run to be listed.
    /// Override: `CASTPLUS_RECEIVER_APP_ID`
    pub receiver_app_id: String,

    /// Transport families to browse for.
    pub families: Vec<TransportFamily>,

    /// Seconds to watch before exiting (0 = until Ctrl+C).
    /// Override: `CASTPLUS_WATCH_SECS`
    pub watch_secs: u64,

    /// Milliseconds to wait for a session end after a stop request.
    /// Override: `CASTPLUS_STOP_TIMEOUT_MS`
    pub stop_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let core = castplus_core::Config::default();
        Self {
            receiver_app_id: core.receiver_app_id,
            families: vec![TransportFamily::Cast, TransportFamily::Mirroring],
            watch_secs: 0,
            stop_timeout_ms: core.stop_timeout_ms,
        }
    }
}

impl MonitorConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// Unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CASTPLUS_RECEIVER_APP_ID") {
            if !val.trim().is_empty() {
                self.receiver_app_id = val.trim().to_string();
            }
        }

        if let Some(val) = lookup("CASTPLUS_WATCH_SECS") {
            if let Ok(secs) = val.parse() {
                self.watch_secs = secs;
            }
        }

        if let Some(val) = lookup("CASTPLUS_STOP_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.stop_timeout_ms = ms;
            }
        }
    }

    /// Converts to castplus-core's Config type.
    pub fn to_core_config(&self) -> castplus_core::Config {
        castplus_core::Config {
            receiver_app_id: self.receiver_app_id.clone(),
            stop_timeout_ms: self.stop_timeout_ms,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_browse_both_families() {
        let config = MonitorConfig::default();
        assert_eq!(
            config.families,
            vec![TransportFamily::Cast, TransportFamily::Mirroring]
        );
        assert_eq!(config.receiver_app_id, "CC1AD845");
        assert_eq!(config.watch_secs, 0);
    }

    #[test]
    fn loads_partial_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "families: [mirroring]\nwatch_secs: 30").unwrap();

        let config = MonitorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.families, vec![TransportFamily::Mirroring]);
        assert_eq!(config.watch_secs, 30);
        assert_eq!(config.receiver_app_id, "CC1AD845");
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "families: [toaster]").unwrap();

        let err = MonitorConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MonitorConfig::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CASTPLUS_RECEIVER_APP_ID", "ABCD1234"),
            ("CASTPLUS_WATCH_SECS", "not-a-number"),
            ("CASTPLUS_STOP_TIMEOUT_MS", "2500"),
        ]);
        let mut config = MonitorConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.receiver_app_id, "ABCD1234");
        assert_eq!(config.watch_secs, 0);
        assert_eq!(config.stop_timeout_ms, 2500);

        let core = config.to_core_config();
        assert_eq!(core.receiver_app_id, "ABCD1234");
        assert_eq!(core.stop_timeout_ms, 2500);
    }
}
