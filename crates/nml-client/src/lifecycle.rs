//! Start/stop state machine around the single live client handle.
//!
//! ```text
//! Uninitialized ──start──▶ Starting ──ok──▶ Running ──stop──▶ Stopping ──▶ Stopped
//!                              │                                             ▲
//!                              └────────────────── err ──────────────────────┘
//! ```
//!
//! `Stopped` may be started again; the host drives one activate/deactivate
//! cycle at a time. Both transitions take `&mut self`, so a stop can never be
//! issued while a start is still in flight.

use std::fmt;

use thiserror::Error;

use crate::client::{ClientError, LanguageClient};

/// Lifecycle states of the client handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No client has been started yet.
    #[default]
    Uninitialized,
    /// The client's `start` is in progress.
    Starting,
    /// The client started and is live.
    Running,
    /// The client's `stop` is in progress.
    Stopping,
    /// The client was stopped, or failed to start.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        formatter.write_str(label)
    }
}

/// Errors raised by lifecycle transitions.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A client is already live; a second one is never started.
    #[error("a language client is already {state}")]
    AlreadyActive {
        /// State the lifecycle was in when the start was rejected.
        state: LifecycleState,
    },

    /// The client failed to start.
    #[error("language client failed to start: {source}")]
    Start {
        /// Error reported by the client.
        #[source]
        source: ClientError,
    },

    /// The client failed to stop. The handle is released regardless.
    #[error("language client failed to stop: {source}")]
    Stop {
        /// Error reported by the client.
        #[source]
        source: ClientError,
    },
}

/// Owns at most one live client and sequences its transitions.
#[derive(Debug)]
pub struct ClientLifecycle<C> {
    state: LifecycleState,
    client: Option<C>,
}

impl<C> Default for ClientLifecycle<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ClientLifecycle<C> {
    /// Creates a lifecycle with no client.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            client: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether a started client is live.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, LifecycleState::Running)
    }

    /// The live client, if any.
    #[must_use]
    pub const fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    /// The live client, if any.
    pub fn client_mut(&mut self) -> Option<&mut C> {
        self.client.as_mut()
    }
}

impl<C> ClientLifecycle<C>
where
    C: LanguageClient,
{
    /// Starts `client` and keeps it as the live handle.
    ///
    /// A failed start drops the client and leaves the lifecycle `Stopped`;
    /// there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyActive`] when a client is live, or
    /// [`LifecycleError::Start`] when the client fails to start.
    pub fn start(&mut self, mut client: C) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Uninitialized | LifecycleState::Stopped => {}
            state => return Err(LifecycleError::AlreadyActive { state }),
        }

        self.state = LifecycleState::Starting;
        match client.start() {
            Ok(()) => {
                self.client = Some(client);
                self.state = LifecycleState::Running;
                Ok(())
            }
            Err(source) => {
                self.state = LifecycleState::Stopped;
                Err(LifecycleError::Start { source })
            }
        }
    }

    /// Stops and releases the live client. Without one this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Stop`] when the client reports a failure.
    /// The handle is released and the state is `Stopped` either way.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        let running = self.is_running();
        let Some(mut client) = self.client.take_if(|_| running) else {
            return Ok(());
        };

        self.state = LifecycleState::Stopping;
        let result = client.stop();
        drop(client);
        self.state = LifecycleState::Stopped;
        result.map_err(|source| LifecycleError::Stop { source })
    }
}
