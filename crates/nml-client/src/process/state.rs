//! Internal state of the server process.

use std::io::{self, Write};
use std::process::{Child, ChildStdin, ChildStdout};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type SharedStdin = Mutex<Option<ChildStdin>>;

/// Writer feeding the server's standard input.
///
/// The writer owns the pipe: dropping it closes the server's input. The
/// client keeps a weak link so `stop` can close the pipe even while the
/// writer sits on a relay thread.
#[derive(Debug)]
pub struct ServerInput(Arc<SharedStdin>);

impl ServerInput {
    pub(crate) fn new(stdin: ChildStdin) -> (Self, InputCloser) {
        let shared = Arc::new(Mutex::new(Some(stdin)));
        let closer = InputCloser(Arc::downgrade(&shared));
        (Self(shared), closer)
    }

    /// Whether the pipe is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Write for ServerInput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_mut().map_or_else(
            || Err(io::Error::from(io::ErrorKind::BrokenPipe)),
            |stdin| stdin.write(buf),
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_mut().map_or(Ok(()), Write::flush)
    }
}

/// Weak handle used by the client to close the server's input on stop.
#[derive(Debug)]
pub struct InputCloser(Weak<SharedStdin>);

impl InputCloser {
    /// Closes the pipe if a writer still holds it.
    pub(crate) fn close(&self) {
        if let Some(shared) = self.0.upgrade() {
            drop(shared.lock().unwrap_or_else(PoisonError::into_inner).take());
        }
    }
}

/// Standard-io endpoints of a running server.
#[derive(Debug)]
pub struct ServerStdio {
    /// Writes reach the server's standard input.
    pub stdin: ServerInput,
    /// Reads come from the server's standard output.
    pub stdout: ChildStdout,
}

/// Lifecycle of the child process owned by a [`ProcessClient`](super::ProcessClient).
#[derive(Debug)]
pub enum ProcessState {
    /// Process has not been started.
    NotStarted,
    /// Process is running.
    Running {
        /// The child process handle.
        child: Child,
        /// Closes the server's input even after the host took the streams.
        input: InputCloser,
        /// Stdio endpoints, until the host takes them for relaying.
        stdio: Option<ServerStdio>,
    },
    /// Process has been stopped.
    Stopped,
}

impl ProcessState {
    /// Short label used in logs and debug output.
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running { .. } => "running",
            Self::Stopped => "stopped",
        }
    }
}
