//! Desktop notifications via `notify-send`

use async_trait::async_trait;
use dailyfour_host_api::{HostResult, Notifier};
use std::time::Duration;
use tracing::{info, warn};

use crate::run_with_timeout;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct NotifySendNotifier {
    timeout: Duration,
}

impl Default for NotifySendNotifier {
    fn default() -> Self {
        Self {
            timeout: NOTIFY_TIMEOUT,
        }
    }
}

#[async_trait]
impl Notifier for NotifySendNotifier {
    async fn notify(&self, title: &str, message: &str) -> HostResult<()> {
        match run_with_timeout("notify-send", &[title, message], self.timeout).await {
            Ok(_) => {
                info!(title = %title, message = %message, "Notification sent");
                Ok(())
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Failed to send notification");
                Err(e)
            }
        }
    }
}
