//! Process-backed implementation of the client seam.
//!
//! [`ProcessClient`] spawns the server with piped standard input and output
//! and hands those streams to the host untouched; it does not interpret the
//! bytes flowing through them. When a trace channel is configured, the
//! server's standard error is forwarded to it line by line.

mod state;
mod terminate;

use std::fmt;
use std::io::{self, BufRead, BufReader};
use std::process::{ChildStderr, Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::client::{ClientError, ClientFactory, LanguageClient};
use crate::launch::LaunchSpec;
use crate::options::{ClientOptions, TraceChannel};

pub use state::{InputCloser, ProcessState, ServerInput, ServerStdio};
use terminate::{GRACE_PERIOD, terminate_child};

/// Log target for server process management.
pub(crate) const PROCESS_TARGET: &str = "nml_client::process";

/// Client that owns the language server as a child process.
pub struct ProcessClient {
    name: String,
    launch: LaunchSpec,
    trace: Option<TraceChannel>,
    state: ProcessState,
    exit_status: Option<ExitStatus>,
}

impl ProcessClient {
    /// Creates a client for `launch`. Nothing is spawned until [`start`].
    ///
    /// [`start`]: LanguageClient::start
    #[must_use]
    pub fn new(name: impl Into<String>, launch: LaunchSpec, options: &ClientOptions) -> Self {
        Self {
            name: name.into(),
            launch,
            trace: options.trace_channel().cloned(),
            state: ProcessState::NotStarted,
            exit_status: None,
        }
    }

    /// Process id of the running server.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        match &self.state {
            ProcessState::Running { child, .. } => Some(child.id()),
            ProcessState::NotStarted | ProcessState::Stopped => None,
        }
    }

    /// Exit status recorded by the last `stop`.
    #[must_use]
    pub const fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Takes the server's stdin and stdout so the host can relay them.
    ///
    /// Returns `None` when the server is not running or the streams were
    /// already taken.
    pub fn take_stdio(&mut self) -> Option<ServerStdio> {
        match &mut self.state {
            ProcessState::Running { stdio, .. } => stdio.take(),
            ProcessState::NotStarted | ProcessState::Stopped => None,
        }
    }

    fn spawn(&self) -> Result<ProcessState, ClientError> {
        let command_text = self.launch.command().display().to_string();
        debug!(
            target: PROCESS_TARGET,
            client = %self.name,
            command = %command_text,
            args = ?self.launch.args(),
            transport = %self.launch.transport(),
            "spawning language server process"
        );

        let stderr = if self.trace.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(self.launch.command())
            .args(self.launch.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    ClientError::BinaryNotFound {
                        command: command_text.clone(),
                        source,
                    }
                } else {
                    ClientError::SpawnFailed {
                        message: format!("failed to start {command_text}"),
                        source,
                    }
                }
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ClientError::SpawnFailed {
                message: String::from("failed to capture server stdio"),
                source: io::Error::other("stdio not piped"),
            });
        };

        if let (Some(channel), Some(stderr)) = (&self.trace, child.stderr.take()) {
            channel.append_line(&format!("starting {}", self.launch));
            forward_stderr(stderr, channel.clone());
        }

        debug!(
            target: PROCESS_TARGET,
            client = %self.name,
            pid = child.id(),
            "language server process spawned"
        );

        let (stdin, input) = ServerInput::new(stdin);
        Ok(ProcessState::Running {
            child,
            input,
            stdio: Some(ServerStdio { stdin, stdout }),
        })
    }
}

impl LanguageClient for ProcessClient {
    fn start(&mut self) -> Result<(), ClientError> {
        if matches!(self.state, ProcessState::Running { .. }) {
            return Err(ClientError::SpawnFailed {
                message: format!("{} is already running", self.name),
                source: io::Error::from(io::ErrorKind::AlreadyExists),
            });
        }
        self.state = self.spawn()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ClientError> {
        let ProcessState::Running {
            mut child,
            input,
            stdio,
        } = std::mem::replace(&mut self.state, ProcessState::Stopped)
        else {
            debug!(
                target: PROCESS_TARGET,
                client = %self.name,
                "stop requested with no running server"
            );
            return Ok(());
        };

        // Closing stdin is the server's cue to exit, wherever the writer lives.
        drop(stdio);
        input.close();
        let status = terminate_child(&mut child, &self.name, GRACE_PERIOD).map_err(|source| {
            ClientError::StopFailed {
                message: format!("failed to terminate {}", self.name),
                source,
            }
        })?;
        if let Some(channel) = &self.trace {
            channel.append_line(&format!("server exited: {status}"));
        }
        self.exit_status = Some(status);
        Ok(())
    }
}

impl Drop for ProcessClient {
    fn drop(&mut self) {
        if let ProcessState::Running { mut child, .. } =
            std::mem::replace(&mut self.state, ProcessState::Stopped)
        {
            if let Err(error) = child.kill() {
                warn!(
                    target: PROCESS_TARGET,
                    client = %self.name,
                    error = %error,
                    "failed to kill language server process on drop"
                );
            } else {
                let _ = child.wait();
            }
        }
    }
}

impl fmt::Debug for ProcessClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessClient")
            .field("name", &self.name)
            .field("launch", &self.launch)
            .field("state", &self.state.label())
            .field("pid", &self.id())
            .finish()
    }
}

/// Builds [`ProcessClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessClientFactory;

impl ClientFactory for ProcessClientFactory {
    type Client = ProcessClient;

    fn create(&self, name: &str, launch: &LaunchSpec, options: &ClientOptions) -> Self::Client {
        ProcessClient::new(name, launch.clone(), options)
    }
}

fn forward_stderr(stderr: ChildStderr, channel: TraceChannel) {
    let spawned = thread::Builder::new()
        .name(String::from("nml-trace"))
        .spawn(move || {
            for line in BufReader::new(stderr).lines() {
                match line {
                    Ok(line) => channel.append_line(&line),
                    Err(_) => break,
                }
            }
        });
    if let Err(error) = spawned {
        warn!(
            target: PROCESS_TARGET,
            error = %error,
            "failed to start trace forwarding thread"
        );
    }
}
