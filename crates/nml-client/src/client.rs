//! Seam between the bootstrap and the protocol client library.
//!
//! The bootstrap never speaks the protocol itself. It hands a
//! [`LaunchSpec`] and [`ClientOptions`] to a [`ClientFactory`] and drives the
//! resulting [`LanguageClient`] through `start` and `stop`. Tests substitute
//! recording doubles; production uses
//! [`ProcessClientFactory`](crate::process::ProcessClientFactory).

use std::io;

use thiserror::Error;

use crate::launch::LaunchSpec;
use crate::options::ClientOptions;

/// Errors reported by a client while starting or stopping.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server executable could not be found.
    #[error("language server binary not found: {command}")]
    BinaryNotFound {
        /// Command that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server process could not be spawned (permissions, format, ...).
    #[error("failed to spawn language server process: {message}")]
    SpawnFailed {
        /// Description of the spawn failure.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server process could not be stopped cleanly.
    #[error("failed to stop language server process: {message}")]
    StopFailed {
        /// Description of the stop failure.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Protocol client driven through a start/stop lifecycle.
///
/// Each call returns once the operation has completed; the `Result` is the
/// completion signal.
pub trait LanguageClient: Send {
    /// Starts the client, spawning the server process.
    fn start(&mut self) -> Result<(), ClientError>;

    /// Stops the client and releases the server process.
    fn stop(&mut self) -> Result<(), ClientError>;
}

impl<C> LanguageClient for Box<C>
where
    C: LanguageClient + ?Sized,
{
    fn start(&mut self) -> Result<(), ClientError> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<(), ClientError> {
        (**self).stop()
    }
}

/// Constructs clients from a launch specification and options.
pub trait ClientFactory {
    /// Client type produced by the factory.
    type Client: LanguageClient;

    /// Builds a client registered under `name`. The client is not started.
    fn create(&self, name: &str, launch: &LaunchSpec, options: &ClientOptions) -> Self::Client;
}
