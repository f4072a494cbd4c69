//! Progress evaluation against the daily target

use chrono::{DateTime, Local};
use dailyfour_api::{ActiveSessionInfo, PresenceState, ProgressSnapshot};
use dailyfour_config::TargetPolicy;
use dailyfour_util::{elapsed_between, format_hms};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::CoreEvent;

pub const NOTIFICATION_TITLE: &str = "DailyFour";

/// Evaluates the active session on each tick and raises completion once
/// per session
pub struct TimerEngine {
    policy: TargetPolicy,
    state_rx: watch::Receiver<PresenceState>,
    /// Generation of the last session that reached the target
    completed_generation: Option<u64>,
}

impl TimerEngine {
    pub fn new(policy: TargetPolicy, state_rx: watch::Receiver<PresenceState>) -> Self {
        Self {
            policy,
            state_rx,
            completed_generation: None,
        }
    }

    pub fn policy(&self) -> &TargetPolicy {
        &self.policy
    }

    /// One evaluation. Returns `TargetReached` the first time the current
    /// session crosses the target.
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<CoreEvent> {
        let Some(active) = self.active_session() else {
            debug!("No active session, skipping tick");
            return Vec::new();
        };

        let mut snapshot = self.evaluate(&active, now);

        if snapshot.in_overtime() {
            info!(
                elapsed = %format_hms(snapshot.elapsed),
                overtime = %format_hms(snapshot.overtime),
                "Session in overtime"
            );
        } else {
            info!(
                elapsed = %format_hms(snapshot.elapsed),
                remaining = %format_hms(snapshot.remaining),
                "Session in progress"
            );
        }

        if snapshot.in_overtime() && self.completed_generation != Some(active.generation) {
            self.completed_generation = Some(active.generation);
            snapshot.completed = true;
            info!(
                generation = active.generation,
                network = %active.network_name,
                elapsed = %format_hms(snapshot.elapsed),
                "Target reached"
            );
            let message = self.notification_body(&snapshot);
            return vec![CoreEvent::TargetReached {
                snapshot,
                title: NOTIFICATION_TITLE.to_string(),
                message,
            }];
        }

        Vec::new()
    }

    /// Current progress without side effects. `None` while idle.
    pub fn progress(&self, now: DateTime<Local>) -> Option<ProgressSnapshot> {
        self.active_session()
            .map(|active| self.evaluate(&active, now))
    }

    pub fn completion_message(&self) -> String {
        if self.policy.test_mode {
            format!(
                "Test mode: {} min completed. You may leave.",
                self.policy.test_duration.as_secs() / 60
            )
        } else {
            format!(
                "{} hours + {} min buffer completed. You may leave.",
                self.policy.work_duration.as_secs() / 3600,
                self.policy.buffer.as_secs() / 60
            )
        }
    }

    /// Completion text followed by the elapsed and overtime at the moment
    /// the target was reached
    pub fn notification_body(&self, snapshot: &ProgressSnapshot) -> String {
        format!(
            "{}\nElapsed {}, overtime {}.",
            self.completion_message(),
            format_hms(snapshot.elapsed),
            format_hms(snapshot.overtime)
        )
    }

    fn active_session(&self) -> Option<ActiveSessionInfo> {
        self.state_rx.borrow().active().cloned()
    }

    fn evaluate(&self, active: &ActiveSessionInfo, now: DateTime<Local>) -> ProgressSnapshot {
        let target = self.policy.target();
        let elapsed = elapsed_between(active.started_at, now);
        let fraction = if target.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / target.as_secs_f64()
        };
        let target_at = chrono::Duration::from_std(target)
            .ok()
            .and_then(|t| active.started_at.checked_add_signed(t))
            .unwrap_or(active.started_at);

        ProgressSnapshot {
            generation: active.generation,
            network_name: active.network_name.clone(),
            started_at: active.started_at,
            evaluated_at: now,
            elapsed,
            target,
            remaining: target.saturating_sub(elapsed),
            overtime: elapsed.saturating_sub(target),
            fraction,
            completed: self.completed_generation == Some(active.generation) || elapsed >= target,
            target_at,
        }
    }
}
