//! Termination of the server child process.

use std::io;
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::PROCESS_TARGET;

/// Time the server gets to exit on its own after its stdin closes.
pub(crate) const GRACE_PERIOD: Duration = Duration::from_millis(200);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Waits up to `grace` for the child to exit, then kills and reaps it.
///
/// Returns the exit status once the child is gone. A kill that races with a
/// natural exit is not an error.
pub(crate) fn terminate_child(
    child: &mut Child,
    name: &str,
    grace: Duration,
) -> io::Result<ExitStatus> {
    if let Some(status) = wait_for_exit(child, name, grace) {
        debug!(
            target: PROCESS_TARGET,
            client = name,
            ?status,
            "language server exited"
        );
        return Ok(status);
    }

    warn!(
        target: PROCESS_TARGET,
        client = name,
        grace_ms = grace.as_millis(),
        "language server did not exit within grace period, killing"
    );
    match child.kill() {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::InvalidInput => {}
        Err(error) => return Err(error),
    }
    let status = child.wait()?;
    debug!(
        target: PROCESS_TARGET,
        client = name,
        ?status,
        "language server killed"
    );
    Ok(status)
}

fn wait_for_exit(child: &mut Child, name: &str, grace: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {}
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    client = name,
                    error = %error,
                    "failed to check process status"
                );
                return None;
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
