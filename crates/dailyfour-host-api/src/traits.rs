//! Host adapter traits

use async_trait::async_trait;
use thiserror::Error;

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Command {command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Command {command} timed out")]
    Timeout { command: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Reports the name of the wireless network the machine is connected to
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Short name of this probe for logs
    fn name(&self) -> &'static str;

    /// Current network name, or `None` when disconnected or unknown.
    ///
    /// Never fails: tool errors and timeouts are logged and read as `None`.
    async fn probe(&self) -> Option<String>;
}

/// Raises user-visible desktop notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> HostResult<()>;
}
