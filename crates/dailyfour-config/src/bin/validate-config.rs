//! Config validation CLI tool
//!
//! Validates a dailyfour configuration file and reports any errors.

use dailyfour_config::{ConfigError, CURRENT_CONFIG_VERSION, load_config};
use dailyfour_util::{default_config_path, format_hms};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a dailyfour configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!(
                "  Office network: {}",
                config.office_network.as_deref().unwrap_or("(not set, sessions will never start)")
            );
            println!(
                "  Target: {}{}",
                format_hms(config.target.target()),
                if config.target.test_mode { " (test mode)" } else { "" }
            );
            println!(
                "  Polling: network every {}s, timer every {}s",
                config.polling.network_interval.as_secs(),
                config.polling.timer_interval.as_secs()
            );
            println!("  Data dir: {}", config.daemon.data_dir.display());
            println!("  Archive dir: {}", config.daemon.archive_dir.display());
            println!("  Rotate at: {} bytes", config.store.rotate_size_bytes);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
