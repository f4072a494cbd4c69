//! Mock host adapters for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{HostError, HostResult, NetworkProbe, Notifier};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Probe that reports whatever network it was last told to
#[derive(Clone, Default)]
pub struct MockProbe {
    current: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockProbe {
    pub fn new(current: Option<&str>) -> Self {
        let probe = Self::default();
        probe.set(current);
        probe
    }

    pub fn set(&self, network: Option<&str>) {
        *lock(&self.current) = network.map(str::to_string);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkProbe for MockProbe {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn probe(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.current).clone()
    }
}

/// A notification captured by [`MockNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub title: String,
    pub message: String,
}

/// Notifier that records instead of displaying
#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,

    /// Configure notify to fail
    pub fail: Arc<AtomicBool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, title: &str, message: &str) -> HostResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HostError::Internal("Mock notify failure".into()));
        }
        lock(&self.sent).push(SentNotification {
            title: title.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
