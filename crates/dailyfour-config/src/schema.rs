//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Network name that marks presence in the office
    pub office_network: Option<String>,

    /// Global daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// Daily target
    #[serde(default)]
    pub target: RawTargetConfig,

    /// Poll cadence for the background loops
    #[serde(default)]
    pub polling: RawPollingConfig,

    /// Log store settings
    #[serde(default)]
    pub store: RawStoreConfig,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Directory for active log segments
    pub data_dir: Option<PathBuf>,

    /// Directory for rotated segments (default: `<data_dir>/archive`)
    pub archive_dir: Option<PathBuf>,

    /// Directory for the daemon's own log file
    pub log_dir: Option<PathBuf>,

    /// Also write daemon logs to `<log_dir>/dailyfourd.log`
    #[serde(default)]
    pub log_to_file: bool,
}

/// Target settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTargetConfig {
    pub work_duration_hours: Option<u64>,
    pub buffer_minutes: Option<u64>,

    /// Replace the whole target with `test_duration_minutes`
    #[serde(default)]
    pub test_mode: bool,
    pub test_duration_minutes: Option<u64>,
}

/// Polling cadence
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPollingConfig {
    pub network_interval_seconds: Option<u64>,
    pub timer_interval_seconds: Option<u64>,
}

/// Log store settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStoreConfig {
    /// Rotate the active segment once it reaches this many bytes
    pub rotate_size_bytes: Option<u64>,
}
