//! Process execution with timeout support

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use super::DetectError;

/// Run an async Command with a timeout.
///
/// The child is killed when the timeout elapses (`kill_on_drop`).
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, DetectError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(DetectError::Spawn(e)),
        Err(_) => Err(DetectError::Timeout(timeout.as_secs())),
    }
}
