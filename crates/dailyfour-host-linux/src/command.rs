//! Bounded external command execution

use dailyfour_host_api::{HostError, HostResult};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Run `program` to completion, killing it if it outlives `timeout`.
///
/// A non-zero exit status is an error carrying the command's stderr.
pub async fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> HostResult<Output> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| HostError::Timeout {
            command: program.to_string(),
        })??;

    if !output.status.success() {
        return Err(HostError::CommandFailed {
            command: program.to_string(),
            reason: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(output)
}
