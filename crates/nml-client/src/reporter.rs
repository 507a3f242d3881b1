//! Structured reporting for activation and deactivation events.

use std::path::Path;
use std::sync::Arc;

use crate::launch::LaunchSpec;
use crate::manager::ActivationError;

/// Log target for lifecycle events.
pub(crate) const LIFECYCLE_TARGET: &str = "nml_client::lifecycle";

/// Observer notified as the client moves through its lifecycle.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked when the host activates the extension.
    fn activation_starting(&self);

    /// Invoked once the server command has been resolved.
    fn server_resolved(&self, command: &Path);

    /// Invoked after the client started.
    fn client_running(&self, launch: &LaunchSpec);

    /// Invoked when activation fails.
    fn activation_failed(&self, error: &ActivationError);

    /// Invoked when the host deactivates the extension.
    fn deactivation_starting(&self);

    /// Invoked after deactivation completes, whether or not a client was live.
    fn client_stopped(&self);

    /// Invoked when the client fails to stop.
    fn deactivation_failed(&self, error: &ActivationError);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn activation_starting(&self) {
        (**self).activation_starting();
    }

    fn server_resolved(&self, command: &Path) {
        (**self).server_resolved(command);
    }

    fn client_running(&self, launch: &LaunchSpec) {
        (**self).client_running(launch);
    }

    fn activation_failed(&self, error: &ActivationError) {
        (**self).activation_failed(error);
    }

    fn deactivation_starting(&self) {
        (**self).deactivation_starting();
    }

    fn client_stopped(&self) {
        (**self).client_stopped();
    }

    fn deactivation_failed(&self, error: &ActivationError) {
        (**self).deactivation_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn activation_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "activation_starting",
            "activating language client"
        );
    }

    fn server_resolved(&self, command: &Path) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "server_resolved",
            command = %command.display(),
            "resolved language server command"
        );
    }

    fn client_running(&self, launch: &LaunchSpec) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "client_running",
            command = %launch.command().display(),
            args = ?launch.args(),
            transport = %launch.transport(),
            "language client started"
        );
    }

    fn activation_failed(&self, error: &ActivationError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "activation_failed",
            error = %error,
            "language client failed to activate"
        );
    }

    fn deactivation_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "deactivation_starting",
            "deactivating language client"
        );
    }

    fn client_stopped(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "client_stopped",
            "language client stopped"
        );
    }

    fn deactivation_failed(&self, error: &ActivationError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "deactivation_failed",
            error = %error,
            "language client failed to stop cleanly"
        );
    }
}
