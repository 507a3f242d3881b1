//! Command-line runtime for the `nml-client` binary.
//!
//! Configuration flags ahead of the command go to `ortho_config`; the command
//! itself is parsed by `clap`. Output streams are injected so tests can
//! capture them.

mod config;
mod errors;
mod relay;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::mpsc;

use clap::{Parser, Subcommand};
use clap::error::ErrorKind;
use nml_config::Config;
use serde::Serialize;
use tracing::info;

use crate::launch::LaunchSpec;
use crate::manager::ClientLifecycleManager;
use crate::options::{ClientOptions, TraceChannel};
use crate::process::{ProcessClient, ProcessClientFactory, ServerStdio};
use crate::reporter::LIFECYCLE_TARGET;
use crate::shutdown::{SystemShutdownSignal, signal_name};
use crate::telemetry;

use config::{ConfigLoader, OrthoConfigLoader, prepare_cli_arguments, split_config_arguments};
pub(crate) use errors::AppError;
use relay::{
    DRAIN_TIMEOUT, Direction, SessionEnd, SessionEvents, spawn_pump, spawn_signal_watch,
};

/// Command-line interface for the NML language client.
#[derive(Parser, Debug)]
#[command(name = "nml-client", disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Commands understood by the client binary.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Prints the resolved language server command.
    Resolve,
    /// Prints the launch specification and client options as JSON.
    LaunchSpec,
    /// Starts the server and relays standard io until either side closes.
    Run,
}

#[derive(Serialize)]
struct LaunchReport<'a> {
    launch: &'a LaunchSpec,
    document_selector: &'a [lsp_types::DocumentFilter],
    trace_channel: Option<&'a TraceChannel>,
}

/// Runs the CLI using the provided arguments and output streams.
///
/// `run` relays the process's own standard input and output, so the caller
/// must not hold a lock on standard output.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let raw_arguments: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&raw_arguments);
    let cli_arguments = prepare_cli_arguments(&raw_arguments, &split);

    let cli = match Cli::try_parse_from(cli_arguments) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(cli.command, &config, stdout));

    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W>(command: CliCommand, config: &Config, stdout: &mut W) -> Result<ExitCode, AppError>
where
    W: Write,
{
    match command {
        CliCommand::Resolve => {
            let manager = ClientLifecycleManager::new(config.client_settings(), ProcessClientFactory);
            let launch = manager.launch_spec();
            writeln!(stdout, "{}", launch.command().display()).map_err(AppError::Emit)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::LaunchSpec => {
            let manager = ClientLifecycleManager::new(config.client_settings(), ProcessClientFactory);
            emit_launch_report(&manager.launch_spec(), &manager.client_options(), stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Run => {
            telemetry::initialise(config)?;
            run_session(config)
        }
    }
}

fn emit_launch_report<W>(launch: &LaunchSpec, options: &ClientOptions, stdout: &mut W) -> Result<(), AppError>
where
    W: Write,
{
    let report = LaunchReport {
        launch,
        document_selector: options.document_selector(),
        trace_channel: options.trace_channel(),
    };
    serde_json::to_writer_pretty(&mut *stdout, &report).map_err(AppError::SerialiseLaunch)?;
    stdout.write_all(b"\n").map_err(AppError::Emit)?;
    stdout.flush().map_err(AppError::Emit)
}

fn run_session(config: &Config) -> Result<ExitCode, AppError> {
    let mut manager = ClientLifecycleManager::new(config.client_settings(), ProcessClientFactory);
    manager.activate()?;

    let events = match relay_stdio(manager.client_mut().and_then(ProcessClient::take_stdio)) {
        Ok(events) => events,
        Err(error) => {
            let _ = manager.deactivate();
            return Err(error);
        }
    };
    let end = events.wait_for_end();
    match end {
        SessionEnd::Signal(signal) => info!(
            target: LIFECYCLE_TARGET,
            signal = signal_name(signal),
            "session ended by signal"
        ),
        other => info!(
            target: LIFECYCLE_TARGET,
            reason = ?other,
            "session ended"
        ),
    }

    let stopped = manager.deactivate();
    if end != SessionEnd::ServerClosed {
        events.drain_server_output(DRAIN_TIMEOUT);
    }
    stopped?;
    Ok(ExitCode::SUCCESS)
}

fn relay_stdio(stdio: Option<ServerStdio>) -> Result<SessionEvents, AppError> {
    let ServerStdio { stdin, stdout } = stdio.ok_or(AppError::MissingStdio)?;
    let (sender, receiver) = mpsc::channel();

    spawn_pump(io::stdin(), stdin, Direction::EditorToServer, sender.clone())
        .map_err(AppError::SpawnRelay)?;
    spawn_pump(stdout, io::stdout(), Direction::ServerToEditor, sender.clone())
        .map_err(AppError::SpawnRelay)?;
    spawn_signal_watch(SystemShutdownSignal, sender).map_err(AppError::SpawnRelay)?;

    Ok(SessionEvents::new(receiver))
}
