//! Launch specification handed to the client library.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Channel the client uses to talk to the server process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// Standard input and output byte streams of the child process.
    #[default]
    Stdio,
}

impl TransportKind {
    /// Stable label used in logs and serialised output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Resolved command, argument vector and transport used to start the server.
///
/// Built fresh on every activation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchSpec {
    command: PathBuf,
    args: Vec<String>,
    transport: TransportKind,
}

impl LaunchSpec {
    /// Builds a standard-io launch specification.
    #[must_use]
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            transport: TransportKind::Stdio,
        }
    }

    /// Executable path or bare command name.
    #[must_use]
    pub fn command(&self) -> &Path {
        self.command.as_path()
    }

    /// Arguments passed to the server, in order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Transport the client connects over.
    #[must_use]
    pub const fn transport(&self) -> TransportKind {
        self.transport
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.command.display())?;
        for arg in &self.args {
            write!(formatter, " {arg}")?;
        }
        write!(formatter, " ({})", self.transport)
    }
}
