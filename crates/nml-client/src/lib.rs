//! Bootstrap for the NML language client.
//!
//! The crate locates the `nmlc` language server, assembles its launch
//! specification and drives a single protocol client through the host's
//! activate and deactivate events. The protocol itself is out of scope: the
//! client is a seam ([`LanguageClient`]) with a process-backed implementation
//! that relays standard io bytes untouched.
//!
//! [`ClientLifecycleManager`] is the entry point for hosts. The `nml-client`
//! binary wraps it with configuration loading, logging and a stdio relay.

mod cli;
mod client;
mod launch;
mod lifecycle;
mod locator;
mod manager;
mod options;
pub mod process;
mod reporter;
mod shutdown;
mod telemetry;

pub use cli::run;
pub use client::{ClientError, ClientFactory, LanguageClient};
pub use launch::{LaunchSpec, TransportKind};
pub use lifecycle::{ClientLifecycle, LifecycleError, LifecycleState};
pub use locator::{Environment, ServerLocator, SystemEnvironment};
pub use manager::{ActivationError, ClientLifecycleManager};
pub use options::{ClientOptions, FILE_SCHEME, TraceChannel};
pub use process::{ProcessClient, ProcessClientFactory};
pub use reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use shutdown::{
    ShutdownError, ShutdownSignal, SystemShutdownSignal, TERMINATION_SIGNALS, signal_name,
};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod tests;
