//! dailyfourd - The dailyfour background service
//!
//! This is the main entry point for the dailyfourd service.
//! It wires together all the components:
//! - Configuration loading and CLI overrides
//! - Session log store
//! - Session and timer engines
//! - Host adapters (Linux network probe, notifications, netlink)

use anyhow::{Context, Result};
use clap::Parser;
use dailyfour_config::{load_config, Config};
use dailyfour_core::{SessionEngine, TimerEngine};
use dailyfour_host_api::{NetworkProbe, Notifier};
use dailyfour_host_linux::{FallbackProbe, LinkWatcher, NotifySendNotifier};
use dailyfour_store::{JsonlLogStore, LogStore};
use dailyfour_util::{default_config_path, format_hms};
use dailyfourd::{run_network_poller, run_progress_timer};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{watch, Mutex, Notify};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "dailyfourd.log";

/// dailyfourd - Office presence tracking service
#[derive(Parser, Debug)]
#[command(name = "dailyfourd")]
#[command(about = "Tracks office presence from the connected wireless network", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/dailyfour/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set DAILYFOUR_DATA_DIR env var)
    #[arg(short, long, env = "DAILYFOUR_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Office network name override (or set DAILYFOUR_OFFICE_NETWORK env var)
    #[arg(short, long, env = "DAILYFOUR_OFFICE_NETWORK")]
    office_network: Option<String>,

    /// Use the short test target instead of work duration plus buffer
    #[arg(long)]
    test_mode: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Load the config file, falling back to defaults when it does not exist,
/// then apply CLI overrides. Returns whether the file was found.
fn load_settings(args: &Args) -> Result<(Config, bool)> {
    let found = args.config.exists();
    let mut config = if found {
        load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        Config::default()
    };

    if let Some(data_dir) = &args.data_dir {
        config = config.with_data_dir(data_dir.clone());
    }
    if let Some(network) = &args.office_network {
        let network = network.trim();
        config.office_network = (!network.is_empty()).then(|| network.to_string());
    }
    if args.test_mode {
        config.target.test_mode = true;
    }

    Ok((config, found))
}

fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let file_layer = if config.daemon.log_to_file {
        let log_dir = &config.daemon.log_dir;
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
        let path = log_dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        Some(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Main service state
struct Service {
    config: Config,
    engine: SessionEngine,
    probe: Arc<dyn NetworkProbe>,
    notifier: Arc<dyn Notifier>,
}

impl Service {
    async fn new(config: Config) -> Result<Self> {
        let daemon = &config.daemon;
        std::fs::create_dir_all(&daemon.data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", daemon.data_dir))?;
        std::fs::create_dir_all(&daemon.archive_dir).with_context(|| {
            format!("Failed to create archive directory {:?}", daemon.archive_dir)
        })?;

        let store: Arc<dyn LogStore> = Arc::new(
            JsonlLogStore::open(
                &daemon.data_dir,
                &daemon.archive_dir,
                config.store.rotate_size_bytes,
            )
            .with_context(|| format!("Failed to open session log in {:?}", daemon.data_dir))?,
        );

        info!(
            data_dir = %daemon.data_dir.display(),
            archive_dir = %daemon.archive_dir.display(),
            "Store initialized"
        );

        let probe: Arc<dyn NetworkProbe> = Arc::new(FallbackProbe::system());
        let notifier: Arc<dyn Notifier> = Arc::new(NotifySendNotifier::default());

        let mut engine = SessionEngine::new(
            config.office_network.clone(),
            config.target.target_minutes(),
            store,
        );

        let observation = probe.probe().await;
        info!(network = ?observation, "Initial network observation");
        engine.recover(observation, dailyfour_util::now());

        Ok(Self {
            config,
            engine,
            probe,
            notifier,
        })
    }

    async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let wake = Arc::new(Notify::new());

        let timer = TimerEngine::new(self.config.target, self.engine.subscribe());
        let engine = Arc::new(Mutex::new(self.engine));

        let poller = tokio::spawn(run_network_poller(
            engine.clone(),
            self.probe.clone(),
            self.config.polling.network_interval,
            wake.clone(),
            shutdown_rx.clone(),
        ));
        let ticker = tokio::spawn(run_progress_timer(
            timer,
            self.notifier.clone(),
            self.config.polling.timer_interval,
            shutdown_rx.clone(),
        ));
        let watcher = tokio::spawn(LinkWatcher::new(wake).run(shutdown_rx));

        // Set up signal handlers
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        info!(
            target = %format_hms(self.config.target.target()),
            test_mode = self.config.target.test_mode,
            "Service running"
        );

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
            _ = sighup.recv() => info!("Received SIGHUP, shutting down gracefully"),
        }

        info!("Shutting down dailyfourd");
        let _ = shutdown_tx.send(true);

        let tasks = [
            ("network poller", poller),
            ("progress timer", ticker),
            ("netlink watcher", watcher),
        ];
        for (name, handle) in tasks {
            if let Err(e) = handle.await {
                warn!(task = name, error = %e, "Task ended abnormally");
            }
        }

        // An active session stays open on disk and is resumed on next start
        let mut engine = engine.lock().await;
        engine.flush_pending();
        if let Some(session) = engine.current() {
            info!(
                network = %session.network_name,
                started_at = %session.started_at,
                "Leaving active session open for recovery"
            );
        }
        if engine.pending_count() > 0 {
            warn!(
                pending = engine.pending_count(),
                "Exiting with unwritten session records"
            );
        }

        info!("Shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_found) = load_settings(&args)?;
    init_logging(&args, &config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "dailyfourd starting"
    );
    if config_found {
        info!(config_path = %args.config.display(), "Configuration loaded");
    } else {
        warn!(config_path = %args.config.display(), "Config file not found, using defaults");
    }

    let service = Service::new(config).await?;
    service.run().await
}
