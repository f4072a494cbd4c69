//! Validated configuration structures

use crate::schema::{RawConfig, RawDaemonConfig, RawPollingConfig, RawStoreConfig, RawTargetConfig};
use dailyfour_util::{archive_dir_for, default_data_dir, default_log_dir};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORK_DURATION_HOURS: u64 = 4;
pub const DEFAULT_BUFFER_MINUTES: u64 = 10;
pub const DEFAULT_TEST_DURATION_MINUTES: u64 = 2;
pub const DEFAULT_NETWORK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TIMER_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_ROTATE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Validated configuration ready for use by the daemon
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Network name that marks presence. None means no session ever starts.
    pub office_network: Option<String>,
    pub daemon: DaemonConfig,
    pub target: TargetPolicy,
    pub polling: PollingConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            office_network: raw.office_network.map(|n| n.trim().to_string()),
            daemon: DaemonConfig::from_raw(raw.daemon),
            target: TargetPolicy::from_raw(raw.target),
            polling: PollingConfig::from_raw(raw.polling),
            store: StoreConfig::from_raw(raw.store),
        }
    }

    /// Point data and archive at a different data directory
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.daemon.archive_dir = archive_dir_for(&data_dir);
        self.daemon.data_dir = data_dir;
        self
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_to_file: bool,
}

impl DaemonConfig {
    fn from_raw(raw: RawDaemonConfig) -> Self {
        let data_dir = raw.data_dir.unwrap_or_else(default_data_dir);
        Self {
            archive_dir: raw.archive_dir.unwrap_or_else(|| archive_dir_for(&data_dir)),
            data_dir,
            log_dir: raw.log_dir.unwrap_or_else(default_log_dir),
            log_to_file: raw.log_to_file,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_raw(RawDaemonConfig::default())
    }
}

/// How long a session must last to count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPolicy {
    pub work_duration: Duration,
    pub buffer: Duration,
    /// Short mode: `test_duration` replaces the whole target
    pub test_mode: bool,
    pub test_duration: Duration,
}

impl TargetPolicy {
    fn from_raw(raw: RawTargetConfig) -> Self {
        let hours = raw.work_duration_hours.unwrap_or(DEFAULT_WORK_DURATION_HOURS);
        let buffer = raw.buffer_minutes.unwrap_or(DEFAULT_BUFFER_MINUTES);
        let test = raw
            .test_duration_minutes
            .unwrap_or(DEFAULT_TEST_DURATION_MINUTES);

        Self {
            work_duration: Duration::from_secs(hours * 3600),
            buffer: Duration::from_secs(buffer * 60),
            test_mode: raw.test_mode,
            test_duration: Duration::from_secs(test * 60),
        }
    }

    /// Effective target: work duration plus buffer, or the test duration
    pub fn target(&self) -> Duration {
        if self.test_mode {
            self.test_duration
        } else {
            self.work_duration + self.buffer
        }
    }

    pub fn target_minutes(&self) -> u64 {
        self.target().as_secs() / 60
    }
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self::from_raw(RawTargetConfig::default())
    }
}

/// Cadence of the two background loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub network_interval: Duration,
    pub timer_interval: Duration,
}

impl PollingConfig {
    fn from_raw(raw: RawPollingConfig) -> Self {
        Self {
            network_interval: Duration::from_secs(
                raw.network_interval_seconds
                    .unwrap_or(DEFAULT_NETWORK_INTERVAL_SECS),
            ),
            timer_interval: Duration::from_secs(
                raw.timer_interval_seconds
                    .unwrap_or(DEFAULT_TIMER_INTERVAL_SECS),
            ),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self::from_raw(RawPollingConfig::default())
    }
}

/// Log store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub rotate_size_bytes: u64,
}

impl StoreConfig {
    fn from_raw(raw: RawStoreConfig) -> Self {
        Self {
            rotate_size_bytes: raw.rotate_size_bytes.unwrap_or(DEFAULT_ROTATE_SIZE_BYTES),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_raw(RawStoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_work_plus_buffer() {
        let policy = TargetPolicy {
            work_duration: Duration::from_secs(4 * 3600),
            buffer: Duration::from_secs(10 * 60),
            test_mode: false,
            test_duration: Duration::from_secs(120),
        };
        assert_eq!(policy.target_minutes(), 250);
    }

    #[test]
    fn test_mode_substitutes_whole_target() {
        let policy = TargetPolicy {
            test_mode: true,
            ..TargetPolicy::default()
        };
        assert_eq!(policy.target(), Duration::from_secs(120));
    }

    #[test]
    fn archive_follows_data_dir_override() {
        let config = Config::default().with_data_dir(PathBuf::from("/tmp/df"));
        assert_eq!(config.daemon.archive_dir, PathBuf::from("/tmp/df/archive"));
    }

    #[test]
    fn office_network_is_trimmed() {
        let raw: RawConfig =
            toml::from_str("config_version = 1\noffice_network = \" Office \"").unwrap();
        assert_eq!(Config::from_raw(raw).office_network.as_deref(), Some("Office"));
    }
}
