//! Integration tests for dailyfourd
//!
//! These tests verify end-to-end behavior across the store, the engines and
//! the background loops.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use dailyfour_api::{PresenceState, SessionOrigin, SessionRecord};
use dailyfour_config::TargetPolicy;
use dailyfour_core::{CoreEvent, SessionEngine, TimerEngine};
use dailyfour_host_api::{MockNotifier, MockProbe};
use dailyfour_store::{JsonlLogStore, LogStore};
use dailyfourd::{run_network_poller, run_progress_timer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};

const TARGET_MINUTES: u64 = 250;

fn at(h: u32, m: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 2, 13, h, m, 0).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 13).unwrap()
}

fn office() -> Option<String> {
    Some("Office".to_string())
}

fn open_store(dir: &Path, rotate: u64) -> Arc<JsonlLogStore> {
    let data = dir.join("data");
    Arc::new(JsonlLogStore::open(&data, dir.join("archive"), rotate).unwrap())
}

fn engine_on(store: Arc<JsonlLogStore>) -> SessionEngine {
    SessionEngine::new(office(), TARGET_MINUTES, store)
}

#[test]
fn test_recovery_resumes_when_still_connected() {
    let dir = tempfile::tempdir().unwrap();

    // Previous process started a session and died
    {
        let mut engine = engine_on(open_store(dir.path(), 1024 * 1024));
        engine.observe(office(), at(9, 0));
    }

    let store = open_store(dir.path(), 1024 * 1024);
    let mut engine = engine_on(store.clone());
    let events = engine.recover(office(), at(11, 30));

    assert!(matches!(events.as_slice(), [CoreEvent::SessionResumed { .. }]));
    let state = engine.state();
    let active = state.active().unwrap();
    assert_eq!(active.started_at, at(9, 0));
    assert_eq!(active.origin, SessionOrigin::Recovered);

    // Later disconnect closes the original session with the full duration
    engine.observe(None, at(13, 30));
    let sessions = store.read_day(day()).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(sessions[0].duration_minutes, Some(270));
    assert!(sessions[0].target_met);
}

#[test]
fn test_recovery_closes_when_disconnected() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut engine = engine_on(open_store(dir.path(), 1024 * 1024));
        engine.observe(office(), at(9, 0));
    }

    let mut engine = engine_on(open_store(dir.path(), 1024 * 1024));
    engine.recover(None, at(10, 45));
    assert_eq!(engine.state(), PresenceState::Idle);

    // Read back through a fresh handle, as a reporting consumer would
    let store = open_store(dir.path(), 1024 * 1024);
    let sessions = store.read_day(day()).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].end_time, NaiveTime::from_hms_opt(10, 45, 0));
    assert_eq!(sessions[0].duration_minutes, Some(105));
    assert!(!sessions[0].target_met);
    assert_eq!(store.find_latest_incomplete().unwrap(), None);
}

#[test]
fn test_recovery_of_legacy_record() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("sessions_13-02-2026.log"),
        "{\"date\": \"13-02-2026\", \"ssid\": \"Office\", \"start_time\": \"08:15:00\", \
         \"end_time\": null, \"duration_minutes\": null, \"completed_4h\": false}\n",
    )
    .unwrap();

    let mut engine = engine_on(open_store(dir.path(), 1024 * 1024));
    engine.recover(office(), at(9, 0));
    assert_eq!(engine.current().unwrap().started_at, at(8, 15));
}

#[test]
fn test_day_of_sessions_across_rotation() {
    let dir = tempfile::tempdir().unwrap();
    // Small enough that every couple of records rotates
    let store = open_store(dir.path(), 200);
    let mut engine = engine_on(store.clone());

    let mut closed = Vec::new();
    for hour in [8, 10, 12, 14, 16] {
        engine.observe(office(), at(hour, 0));
        for event in engine.observe(Some("Cafe".into()), at(hour, 50)) {
            if let CoreEvent::SessionClosed { record, persisted } = event {
                assert!(persisted);
                closed.push(record);
            }
        }
        assert!(engine.observe(None, at(hour + 1, 0)).is_empty());
    }

    let sessions = store.read_day(day()).unwrap();
    assert_eq!(sessions, closed);
    assert_eq!(sessions.len(), 5);
    assert!(sessions.iter().all(|s| s.duration_minutes == Some(50)));
    let starts: Vec<_> = sessions.iter().map(|s| s.start_time).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);

    let archived = std::fs::read_dir(dir.path().join("archive")).unwrap().count();
    assert!(archived >= 2, "expected rotated parts, found {archived}");
}

#[test]
fn test_flapping_connection_appends_once_per_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), 1024 * 1024);
    let mut engine = engine_on(store.clone());

    let observations = [
        office(),
        office(),
        Some(" Office".into()),
        None,
        None,
        office(),
        Some("Guest".into()),
        office(),
        office(),
        None,
    ];
    let mut closes = 0;
    for (i, observation) in observations.into_iter().enumerate() {
        let events = engine.observe(observation, at(9, i as u32));
        closes += events
            .iter()
            .filter(|e| matches!(e, CoreEvent::SessionClosed { .. }))
            .count();
    }

    assert_eq!(closes, 3);
    let sessions = store.read_day(day()).unwrap();
    assert_eq!(sessions.len(), 3);
    assert!(sessions.iter().all(|s| !s.is_open()));
}

#[test]
fn test_timer_follows_session_engine() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_on(open_store(dir.path(), 1024 * 1024));
    let policy = TargetPolicy {
        work_duration: Duration::from_secs(4 * 3600),
        buffer: Duration::from_secs(10 * 60),
        test_mode: false,
        test_duration: Duration::from_secs(120),
    };
    let mut timer = TimerEngine::new(policy, engine.subscribe());

    assert!(timer.tick(at(9, 0)).is_empty());
    engine.observe(office(), at(9, 0));

    let progress = timer.progress(at(12, 59)).unwrap();
    assert_eq!(progress.remaining, Duration::from_secs(11 * 60));

    assert_eq!(timer.tick(at(13, 11)).len(), 1);
    assert!(timer.tick(at(13, 12)).is_empty());

    // Closing and reconnecting gives a fresh completion
    engine.observe(None, at(13, 20));
    assert!(timer.progress(at(13, 21)).is_none());
    engine.observe(office(), at(14, 0));
    assert!(timer.tick(at(17, 0)).is_empty());
    assert_eq!(timer.tick(at(18, 10)).len(), 1);
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_poller_reacts_to_wake_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path(), 1024 * 1024);
    let engine = engine_on(store.clone());
    let mut state_rx = engine.subscribe();
    let engine = Arc::new(Mutex::new(engine));

    let probe = MockProbe::new(None);
    let wake = Arc::new(Notify::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = tokio::spawn(run_network_poller(
        engine.clone(),
        Arc::new(probe.clone()),
        Duration::from_secs(3600),
        wake.clone(),
        shutdown_rx,
    ));

    probe.set(Some("Office"));
    wake.notify_one();
    tokio::time::timeout(Duration::from_secs(5), state_rx.wait_for(|s| s.is_active()))
        .await
        .unwrap()
        .unwrap();

    probe.set(None);
    wake.notify_one();
    tokio::time::timeout(Duration::from_secs(5), state_rx.wait_for(|s| !s.is_active()))
        .await
        .unwrap()
        .unwrap();

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), poller)
        .await
        .unwrap()
        .unwrap();

    let today = dailyfour_util::now().date_naive();
    let sessions: Vec<SessionRecord> = store
        .read_range(today.pred_opt().unwrap(), today)
        .unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(!sessions[0].is_open());
}

#[tokio::test]
async fn test_timer_task_notifies_once() {
    let (state_tx, state_rx) = watch::channel(PresenceState::Idle);
    let policy = TargetPolicy {
        work_duration: Duration::from_secs(4 * 3600),
        buffer: Duration::from_secs(600),
        test_mode: true,
        test_duration: Duration::ZERO,
    };
    let notifier = MockNotifier::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(run_progress_timer(
        TimerEngine::new(policy, state_rx),
        Arc::new(notifier.clone()),
        Duration::from_millis(10),
        shutdown_rx,
    ));

    let mut engine_state = SessionEngine::new(office(), 0, Arc::new(dailyfour_store::MemoryLogStore::new()));
    engine_state.observe(office(), dailyfour_util::now());
    state_tx.send_replace(engine_state.state());

    wait_for(|| !notifier.sent().is_empty()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "DailyFour");
    assert!(sent[0]
        .message
        .starts_with("Test mode: 0 min completed. You may leave.\nElapsed "));

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}
