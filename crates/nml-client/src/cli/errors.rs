//! Error type for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::manager::ActivationError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to serialise launch specification: {0}")]
    SerialiseLaunch(serde_json::Error),
    #[error("failed to write output: {0}")]
    Emit(io::Error),
    #[error(transparent)]
    Activation(#[from] ActivationError),
    #[error("language client started without standard-io streams")]
    MissingStdio,
    #[error("failed to start relay thread: {0}")]
    SpawnRelay(io::Error),
}
