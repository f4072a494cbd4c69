//! Periodic tasks with cooperative shutdown

use dailyfour_core::{CoreEvent, SessionEngine, TimerEngine};
use dailyfour_host_api::{NetworkProbe, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub type SharedEngine = Arc<Mutex<SessionEngine>>;

/// Probe on every interval tick, or early when `wake` fires, and feed the
/// observation to the session engine. Exits at the next tick boundary
/// after shutdown is signalled.
pub async fn run_network_poller(
    engine: SharedEngine,
    probe: Arc<dyn NetworkProbe>,
    interval: Duration,
    wake: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Startup recovery has just probed
    ticker.tick().await;

    info!(interval_secs = interval.as_secs(), probe = probe.name(), "Network poller started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = wake.notified() => {
                debug!("Network poll woken by interface change");
                ticker.reset();
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        if *shutdown.borrow() {
            break;
        }

        let observation = probe.probe().await;
        let events = {
            let mut engine = engine.lock().await;
            engine.observe(observation, dailyfour_util::now())
        };
        log_session_events(&events);
    }

    info!("Network poller stopped");
}

/// Evaluate progress on every interval tick and notify once per session
/// when the target is reached
pub async fn run_progress_timer(
    mut timer: TimerEngine,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_secs = interval.as_secs(), "Progress timer started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        for event in timer.tick(dailyfour_util::now()) {
            if let CoreEvent::TargetReached { title, message, .. } = event
                && let Err(e) = notifier.notify(&title, &message).await
            {
                warn!(error = %e, "Completion notification not delivered");
            }
        }
    }

    info!("Progress timer stopped");
}

fn log_session_events(events: &[CoreEvent]) {
    for event in events {
        match event {
            CoreEvent::AppendFailed { pending, .. } => {
                warn!(pending, "Session record held in memory until the store recovers");
            }
            other => debug!(event = ?other, "Session event"),
        }
    }
}
