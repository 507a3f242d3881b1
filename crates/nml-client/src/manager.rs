//! Activation and deactivation of the language client.
//!
//! [`ClientLifecycleManager`] is the explicit context object the host passes
//! its activate/deactivate events to. It owns the resolved settings, the
//! server locator, the client factory and the single client handle, so no
//! process-wide state is involved.

use std::path::PathBuf;
use std::sync::Arc;

use nml_config::{ClientSettings, EXTENSION_NAME, LANGUAGE_ID};
use thiserror::Error;

use crate::client::{ClientError, ClientFactory};
use crate::launch::LaunchSpec;
use crate::lifecycle::{ClientLifecycle, LifecycleError, LifecycleState};
use crate::locator::{Environment, ServerLocator, SystemEnvironment};
use crate::options::{ClientOptions, TraceChannel};
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};

/// Errors surfaced to the host by activation and deactivation.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// The client failed to start; no retry is attempted.
    #[error("failed to start language client `{launch}`: {source}")]
    Start {
        /// Launch specification that failed.
        launch: String,
        /// Error reported by the client.
        #[source]
        source: ClientError,
    },

    /// The lifecycle rejected the transition or the client failed to stop.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl ActivationError {
    fn from_start(error: LifecycleError, launch: &LaunchSpec) -> Self {
        match error {
            LifecycleError::Start { source } => Self::Start {
                launch: launch.to_string(),
                source,
            },
            other => Self::Lifecycle(other),
        }
    }
}

/// Drives the client through activation and deactivation.
pub struct ClientLifecycleManager<F, E = SystemEnvironment>
where
    F: ClientFactory,
{
    settings: ClientSettings,
    locator: ServerLocator<E>,
    factory: F,
    reporter: Arc<dyn LifecycleReporter>,
    lifecycle: ClientLifecycle<F::Client>,
}

impl<F> ClientLifecycleManager<F, SystemEnvironment>
where
    F: ClientFactory,
{
    /// Builds a manager over the real environment with structured reporting.
    #[must_use]
    pub fn new(settings: ClientSettings, factory: F) -> Self {
        let locator = ServerLocator::new(&settings);
        Self::with_parts(
            settings,
            locator,
            factory,
            Arc::new(StructuredLifecycleReporter::new()),
        )
    }
}

impl<F, E> ClientLifecycleManager<F, E>
where
    F: ClientFactory,
    E: Environment,
{
    /// Builds a manager from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        settings: ClientSettings,
        locator: ServerLocator<E>,
        factory: F,
        reporter: Arc<dyn LifecycleReporter>,
    ) -> Self {
        Self {
            settings,
            locator,
            factory,
            reporter,
            lifecycle: ClientLifecycle::new(),
        }
    }

    /// Settings the manager runs with.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// The live client, if any.
    pub fn client_mut(&mut self) -> Option<&mut F::Client> {
        self.lifecycle.client_mut()
    }

    /// Resolves the server and builds the launch specification.
    #[must_use]
    pub fn launch_spec(&self) -> LaunchSpec {
        self.build_launch_spec(self.locator.resolve())
    }

    /// Builds the client options for the served language.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        let options = ClientOptions::for_language(LANGUAGE_ID);
        if self.settings.enable_trace_channel {
            options.with_trace_channel(TraceChannel::for_extension(EXTENSION_NAME, LANGUAGE_ID))
        } else {
            options
        }
    }

    /// Handles the host's activation event.
    ///
    /// Resolves the server, constructs exactly one client and starts it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyActive`] (wrapped) when a client is
    /// live, or [`ActivationError::Start`] when the client fails to start.
    pub fn activate(&mut self) -> Result<(), ActivationError> {
        self.reporter.activation_starting();
        if self.lifecycle.is_running() {
            let error = ActivationError::Lifecycle(LifecycleError::AlreadyActive {
                state: self.lifecycle.state(),
            });
            self.reporter.activation_failed(&error);
            return Err(error);
        }

        let command = self.locator.resolve();
        self.reporter.server_resolved(&command);
        let launch = self.build_launch_spec(command);
        let options = self.client_options();
        let client = self.factory.create(EXTENSION_NAME, &launch, &options);

        match self.lifecycle.start(client) {
            Ok(()) => {
                self.reporter.client_running(&launch);
                Ok(())
            }
            Err(source) => {
                let error = ActivationError::from_start(source, &launch);
                self.reporter.activation_failed(&error);
                Err(error)
            }
        }
    }

    /// Handles the host's deactivation event.
    ///
    /// Completes immediately when no client is live.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Stop`] (wrapped) when the client fails to
    /// stop; the handle is released regardless.
    pub fn deactivate(&mut self) -> Result<(), ActivationError> {
        self.reporter.deactivation_starting();
        match self.lifecycle.stop() {
            Ok(()) => {
                self.reporter.client_stopped();
                Ok(())
            }
            Err(source) => {
                let error = ActivationError::from(source);
                self.reporter.deactivation_failed(&error);
                Err(error)
            }
        }
    }

    fn build_launch_spec(&self, command: PathBuf) -> LaunchSpec {
        LaunchSpec::new(command, self.settings.server_args.clone())
    }
}
