//! Termination signals that act as the host's deactivation event.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use crate::reporter::LIFECYCLE_TARGET;

/// Signals that end a `run` session.
pub const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Source of the deactivation event.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until the session should end and returns the signal number.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the listener cannot be installed.
    fn wait(&self) -> Result<i32, ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Registering the signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal iterator ended without delivering a signal.
    #[error("signal listener closed without a signal")]
    Closed,
}

/// Listens for [`TERMINATION_SIGNALS`] on the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<i32, ShutdownError> {
        let mut signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError::Install { source })?;
        let signal = signals.forever().next().ok_or(ShutdownError::Closed)?;
        info!(
            target: LIFECYCLE_TARGET,
            signal = signal_name(signal),
            "termination signal received"
        );
        Ok(signal)
    }
}

/// Conventional name of a termination signal, for logs.
#[must_use]
pub fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGTERM => "SIGTERM",
        SIGINT => "SIGINT",
        SIGQUIT => "SIGQUIT",
        SIGHUP => "SIGHUP",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SIGTERM, "SIGTERM")]
    #[case(SIGINT, "SIGINT")]
    #[case(SIGQUIT, "SIGQUIT")]
    #[case(SIGHUP, "SIGHUP")]
    #[case(0, "unknown")]
    fn names_termination_signals(#[case] signal: i32, #[case] expected: &str) {
        assert_eq!(signal_name(signal), expected);
    }
}
