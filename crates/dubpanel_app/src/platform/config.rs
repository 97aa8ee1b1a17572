use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dubpanel_bridge::{BridgeSettings, PollTiming};
use panel_logging::{panel_info, panel_warn, LogDestination};
use serde::Deserialize;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "./dubpanel.ron";

/// Settings read from the RON config file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct PanelConfig {
    pub bridge_url: String,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub reset_grace_ms: u64,
    pub notice_interval_ms: Option<u64>,
    pub log_level: String,
    pub log_destination: LogDestination,
    pub log_file: Option<PathBuf>,
    /// Where the rendered page is mirrored as HTML on every render.
    pub render_path: Option<PathBuf>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            bridge_url: BridgeSettings::default().base_url,
            request_timeout_ms: 10_000,
            poll_interval_ms: 500,
            reset_grace_ms: 2000,
            notice_interval_ms: Some(1000),
            log_level: "info".to_string(),
            log_destination: LogDestination::Terminal,
            log_file: None,
            render_path: None,
        }
    }
}

impl PanelConfig {
    pub(crate) fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            base_url: self.bridge_url.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub(crate) fn poll_timing(&self) -> PollTiming {
        PollTiming {
            // A zero period would make the tokio interval panic.
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            reset_grace: Duration::from_millis(self.reset_grace_ms),
            notice_interval: self
                .notice_interval_ms
                .map(|ms| Duration::from_millis(ms.max(1))),
        }
    }
}

/// Config path from the first CLI argument, else the default location.
pub(crate) fn config_path(mut args: impl Iterator<Item = String>) -> PathBuf {
    args.nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Reads the config, falling back to defaults when the file is missing or
/// cannot be parsed.
pub(crate) fn load_config(path: &Path) -> PanelConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            panel_info!("No config at {:?}, using defaults", path);
            return PanelConfig::default();
        }
        Err(err) => {
            panel_warn!("Failed to read config from {:?}: {}", path, err);
            return PanelConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            panel_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            panel_warn!("Failed to parse config from {:?}: {}", path, err);
            PanelConfig::default()
        }
    }
}
