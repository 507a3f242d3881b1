//! Byte relay between the editor and the server during `run`.
//!
//! Each direction runs on its own thread and reports the event that ends the
//! session over a channel. The bytes are copied verbatim.

use std::io::{self, Read, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::shutdown::ShutdownSignal;

/// Log target for relay activity.
const RELAY_TARGET: &str = "nml_client::relay";

/// Why a `run` session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// The editor closed its side of the stream.
    EditorClosed,
    /// The server closed its standard output.
    ServerClosed,
    /// A termination signal arrived.
    Signal(i32),
}

/// Direction of a relay, for logging.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Direction {
    EditorToServer,
    ServerToEditor,
}

impl Direction {
    const fn label(self) -> &'static str {
        match self {
            Self::EditorToServer => "editor_to_server",
            Self::ServerToEditor => "server_to_editor",
        }
    }

    const fn end(self) -> SessionEnd {
        match self {
            Self::EditorToServer => SessionEnd::EditorClosed,
            Self::ServerToEditor => SessionEnd::ServerClosed,
        }
    }
}

/// Copies `reader` into `writer` until end of input, then reports the end.
///
/// A write error on either side also ends the session. The writer is dropped
/// on return so the far side sees end of input.
pub(crate) fn pump<R, W>(mut reader: R, mut writer: W, direction: Direction, events: &Sender<SessionEnd>)
where
    R: Read,
    W: Write,
{
    let outcome = io::copy(&mut reader, &mut writer).and_then(|bytes| writer.flush().map(|()| bytes));
    match outcome {
        Ok(bytes) => debug!(
            target: RELAY_TARGET,
            direction = direction.label(),
            bytes,
            "relay reached end of input"
        ),
        Err(error) => warn!(
            target: RELAY_TARGET,
            direction = direction.label(),
            error = %error,
            "relay stopped on error"
        ),
    }
    drop(writer);
    let _ = events.send(direction.end());
}

/// Longest wait for the server's remaining output after deactivation.
pub(crate) const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Receiving end of the session events.
pub(crate) struct SessionEvents {
    receiver: Receiver<SessionEnd>,
}

impl SessionEvents {
    pub(crate) const fn new(receiver: Receiver<SessionEnd>) -> Self {
        Self { receiver }
    }

    /// Blocks until the first event that ends the session.
    ///
    /// A closed channel means every relay exited without reporting, which
    /// only happens once the server side is gone.
    pub(crate) fn wait_for_end(&self) -> SessionEnd {
        self.receiver.recv().unwrap_or(SessionEnd::ServerClosed)
    }

    /// Waits until the server's output has been fully forwarded, or until
    /// `timeout` passes. Returns whether the output was drained.
    pub(crate) fn drain_server_output(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(SessionEnd::ServerClosed) | Err(RecvTimeoutError::Disconnected) => return true,
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    debug!(
                        target: RELAY_TARGET,
                        timeout_ms = timeout.as_millis(),
                        "server output still open after deactivation"
                    );
                    return false;
                }
            }
        }
    }
}

/// Starts a named relay thread.
pub(crate) fn spawn_pump<R, W>(
    reader: R,
    writer: W,
    direction: Direction,
    events: Sender<SessionEnd>,
) -> io::Result<()>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    thread::Builder::new()
        .name(format!("nml-relay-{}", direction.label()))
        .spawn(move || pump(reader, writer, direction, &events))
        .map(|_| ())
}

/// Starts a thread that reports [`SessionEnd::Signal`] once `signal` fires.
///
/// A listener that cannot be installed is logged and never ends the session.
pub(crate) fn spawn_signal_watch<S>(signal: S, events: Sender<SessionEnd>) -> io::Result<()>
where
    S: ShutdownSignal + 'static,
{
    thread::Builder::new()
        .name(String::from("nml-signals"))
        .spawn(move || match signal.wait() {
            Ok(number) => {
                let _ = events.send(SessionEnd::Signal(number));
            }
            Err(error) => warn!(
                target: RELAY_TARGET,
                error = %error,
                "signal listener unavailable"
            ),
        })
        .map(|_| ())
}
