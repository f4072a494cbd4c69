//! Default paths for dailyfour components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/dailyfour/config.toml` or `~/.config/dailyfour/config.toml`
//! - Data: `$XDG_DATA_HOME/dailyfour` or `~/.local/share/dailyfour`
//! - Archive: `<data>/archive`
//! - Logs: `$XDG_STATE_HOME/dailyfour` or `~/.local/state/dailyfour`

use std::path::{Path, PathBuf};

/// Environment variable for overriding the data directory
pub const DAILYFOUR_DATA_DIR_ENV: &str = "DAILYFOUR_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "dailyfour";

const CONFIG_FILENAME: &str = "config.toml";

const ARCHIVE_SUBDIR: &str = "archive";

fn xdg_or_home(xdg_var: &str, home_parts: &[&str]) -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(xdg_var) {
        return Some(PathBuf::from(dir).join(APP_DIR));
    }

    let home = std::env::var("HOME").ok()?;
    let mut path = PathBuf::from(home);
    for part in home_parts {
        path.push(part);
    }
    Some(path.join(APP_DIR))
}

/// Get the default configuration file path.
pub fn default_config_path() -> PathBuf {
    xdg_or_home("XDG_CONFIG_HOME", &[".config"])
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_DIR))
        .join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$DAILYFOUR_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/dailyfour` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/dailyfour` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(DAILYFOUR_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking the DAILYFOUR_DATA_DIR env var.
pub fn data_dir_without_env() -> PathBuf {
    xdg_or_home("XDG_DATA_HOME", &[".local", "share"])
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_DIR).join("data"))
}

/// Archive directory for rotated log segments, nested under the data directory.
pub fn archive_dir_for(data_dir: &Path) -> PathBuf {
    data_dir.join(ARCHIVE_SUBDIR)
}

/// Get the default log directory.
pub fn default_log_dir() -> PathBuf {
    xdg_or_home("XDG_STATE_HOME", &[".local", "state"])
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_DIR).join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_config_toml() {
        let path = default_config_path();
        assert!(path.ends_with("dailyfour/config.toml"));
    }

    #[test]
    fn data_dir_contains_app_dir() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("dailyfour"));
    }

    #[test]
    fn log_dir_contains_app_dir() {
        assert!(default_log_dir().to_string_lossy().contains("dailyfour"));
    }

    #[test]
    fn archive_is_nested_under_data() {
        let data = PathBuf::from("/var/lib/dailyfour");
        assert_eq!(archive_dir_for(&data), PathBuf::from("/var/lib/dailyfour/archive"));
    }
}
