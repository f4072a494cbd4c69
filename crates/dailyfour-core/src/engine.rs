//! Session state machine

use chrono::{DateTime, Local};
use dailyfour_api::{PresenceState, SessionRecord};
use dailyfour_store::LogStore;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{CoreEvent, CurrentSession};

/// Turns network observations into sessions and persists them
pub struct SessionEngine {
    office_network: Option<String>,
    target_minutes: u64,
    store: Arc<dyn LogStore>,

    current: Option<CurrentSession>,
    /// Outer `None` until the first observation arrives
    last_observation: Option<Option<String>>,
    /// Closed records whose append failed, oldest first
    pending: VecDeque<SessionRecord>,
    generation: u64,

    state_tx: watch::Sender<PresenceState>,
}

impl SessionEngine {
    pub fn new(
        office_network: Option<String>,
        target_minutes: u64,
        store: Arc<dyn LogStore>,
    ) -> Self {
        let office_network = office_network.and_then(|n| normalize(Some(n)));
        if office_network.is_none() {
            warn!("No office network configured, sessions will never start");
        }
        info!(
            office_network = ?office_network,
            target_minutes,
            "Session engine initialized"
        );

        let (state_tx, _) = watch::channel(PresenceState::Idle);
        Self {
            office_network,
            target_minutes,
            store,
            current: None,
            last_observation: None,
            pending: VecDeque::new(),
            generation: 0,
            state_tx,
        }
    }

    /// Resume or close the session a previous process left open, then apply
    /// the current observation. Runs once, before any other observation.
    pub fn recover(&mut self, observation: Option<String>, now: DateTime<Local>) -> Vec<CoreEvent> {
        let observation = normalize(observation);
        let mut events = Vec::new();

        let incomplete = match self.store.find_latest_incomplete() {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "Recovery scan failed, starting idle");
                None
            }
        };

        match incomplete {
            None => debug!("No open session to recover"),
            Some(record) => {
                let still_connected = observation.as_deref() == Some(record.network_name.as_str());
                let generation = self.generation + 1;

                match CurrentSession::recovered(generation, &record) {
                    Some(session) if still_connected => {
                        self.generation = generation;
                        info!(
                            network = %session.network_name,
                            started_at = %session.started_at,
                            generation,
                            "Resumed session from previous run"
                        );
                        events.push(CoreEvent::SessionResumed {
                            generation,
                            network_name: session.network_name.clone(),
                            started_at: session.started_at,
                        });
                        self.current = Some(session);
                        self.publish();
                    }
                    Some(session) => {
                        let closed = session.close(now, self.target_minutes);
                        info!(
                            record = %closed,
                            observed = ?observation,
                            "Closing session left open by previous run"
                        );
                        events.extend(self.commit(closed));
                    }
                    None => {
                        warn!(
                            record = %record,
                            "Open session start is not a valid local time, closing with zero duration"
                        );
                        let end = now.time();
                        events.extend(self.commit(record.closed(end, 0, self.target_minutes)));
                    }
                }
            }
        }

        events.extend(self.observe(observation, now));
        events
    }

    /// Apply one network observation. Repeats of the previous observation
    /// only retry queued writes.
    pub fn observe(&mut self, observation: Option<String>, now: DateTime<Local>) -> Vec<CoreEvent> {
        let mut events = self.flush_pending();

        let observation = normalize(observation);
        if self.last_observation.as_ref() == Some(&observation) {
            return events;
        }

        info!(
            from = ?self.last_observation.clone().flatten(),
            to = ?observation,
            "Network changed"
        );
        self.last_observation = Some(observation.clone());

        let leaves_session = self
            .current
            .as_ref()
            .is_some_and(|s| observation.as_deref() != Some(s.network_name.as_str()));
        if leaves_session {
            events.extend(self.close_current(now));
        }

        if self.current.is_none()
            && self.is_office(observation.as_deref())
            && let Some(network) = observation
        {
            events.push(self.start(network, now));
        }

        events
    }

    /// Close the current session at `now`. No-op when idle.
    pub fn close_current(&mut self, now: DateTime<Local>) -> Vec<CoreEvent> {
        let Some(session) = self.current.take() else {
            return Vec::new();
        };

        let record = session.close(now, self.target_minutes);
        info!(
            network = %record.network_name,
            duration_minutes = ?record.duration_minutes,
            target_met = record.target_met,
            "Session ended"
        );
        self.publish();
        self.commit(record)
    }

    /// Retry queued records in order, stopping at the first failure
    pub fn flush_pending(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(record) = self.pending.front() {
            if let Err(e) = self.store.append(record) {
                debug!(error = %e, pending = self.pending.len(), "Pending records still not writable");
                break;
            }
            if let Some(record) = self.pending.pop_front() {
                info!(record = %record, "Pending session record written");
                events.push(CoreEvent::PendingPersisted { record });
            }
        }
        events
    }

    pub fn state(&self) -> PresenceState {
        match &self.current {
            Some(session) => PresenceState::Active(session.info()),
            None => PresenceState::Idle,
        }
    }

    /// Read-only view that follows every transition
    pub fn subscribe(&self) -> watch::Receiver<PresenceState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> Option<&CurrentSession> {
        self.current.as_ref()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn office_network(&self) -> Option<&str> {
        self.office_network.as_deref()
    }

    fn is_office(&self, network: Option<&str>) -> bool {
        network.is_some() && network == self.office_network.as_deref()
    }

    fn start(&mut self, network_name: String, now: DateTime<Local>) -> CoreEvent {
        self.generation += 1;
        let session = CurrentSession::fresh(self.generation, network_name, now);

        if let Err(e) = self.store.append(&session.open_record()) {
            warn!(error = %e, "Failed to write session start marker, session is tracked in memory only");
        }

        info!(
            network = %session.network_name,
            started_at = %session.started_at,
            generation = session.generation,
            "Session started"
        );
        let event = CoreEvent::SessionStarted {
            generation: session.generation,
            network_name: session.network_name.clone(),
            started_at: session.started_at,
        };
        self.current = Some(session);
        self.publish();
        event
    }

    /// Write a closed record, or queue it behind earlier unwritten ones
    fn commit(&mut self, record: SessionRecord) -> Vec<CoreEvent> {
        let mut events = self.flush_pending();

        let result = if self.pending.is_empty() {
            self.store.append(&record).map_err(|e| e.to_string())
        } else {
            Err("earlier records are still pending".to_string())
        };

        match result {
            Ok(()) => events.push(CoreEvent::SessionClosed {
                record,
                persisted: true,
            }),
            Err(error) => {
                self.pending.push_back(record.clone());
                error!(
                    record = %record,
                    error = %error,
                    pending = self.pending.len(),
                    "Failed to write session record, will retry"
                );
                events.push(CoreEvent::SessionClosed {
                    record: record.clone(),
                    persisted: false,
                });
                events.push(CoreEvent::AppendFailed {
                    record,
                    error,
                    pending: self.pending.len(),
                });
            }
        }
        events
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state());
    }
}

/// Trimmed network name; blank names read as no network
fn normalize(observation: Option<String>) -> Option<String> {
    observation
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
