//! Recording doubles for the client, factory, reporter and environment seams.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::client::{ClientError, ClientFactory, LanguageClient};
use crate::launch::LaunchSpec;
use crate::locator::Environment;
use crate::manager::ActivationError;
use crate::options::ClientOptions;
use crate::reporter::LifecycleReporter;

/// Calls observed on a [`RecordingClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClientCall {
    Start,
    Stop,
}

#[derive(Debug, Default)]
struct CallState {
    calls: Vec<ClientCall>,
    dropped: bool,
}

/// Shared view of a client's calls that outlives the client itself.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<CallState>>);

impl CallLog {
    fn with<T>(&self, action: impl FnOnce(&mut CallState) -> T) -> T {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        action(&mut state)
    }

    pub(crate) fn recorded(&self) -> Vec<ClientCall> {
        self.with(|state| state.calls.clone())
    }

    pub(crate) fn dropped(&self) -> bool {
        self.with(|state| state.dropped)
    }
}

/// How a [`RecordingClient`] responds to calls.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum Behaviour {
    #[default]
    Succeed,
    FailStart(io::ErrorKind),
    FailStop,
}

/// Client double that records calls instead of spawning anything.
#[derive(Debug)]
pub(crate) struct RecordingClient {
    behaviour: Behaviour,
    log: CallLog,
}

impl RecordingClient {
    pub(crate) fn new() -> Self {
        Self::with_behaviour(Behaviour::Succeed)
    }

    pub(crate) fn failing_start(kind: io::ErrorKind) -> Self {
        Self::with_behaviour(Behaviour::FailStart(kind))
    }

    pub(crate) fn failing_stop() -> Self {
        Self::with_behaviour(Behaviour::FailStop)
    }

    pub(crate) fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            log: CallLog::default(),
        }
    }

    pub(crate) fn calls(&self) -> CallLog {
        self.log.clone()
    }
}

impl LanguageClient for RecordingClient {
    fn start(&mut self) -> Result<(), ClientError> {
        self.log.with(|state| state.calls.push(ClientCall::Start));
        match self.behaviour {
            Behaviour::FailStart(io::ErrorKind::NotFound) => Err(ClientError::BinaryNotFound {
                command: String::from("nmlc"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
            Behaviour::FailStart(kind) => Err(ClientError::SpawnFailed {
                message: String::from("recording client refused to start"),
                source: io::Error::from(kind),
            }),
            Behaviour::Succeed | Behaviour::FailStop => Ok(()),
        }
    }

    fn stop(&mut self) -> Result<(), ClientError> {
        self.log.with(|state| state.calls.push(ClientCall::Stop));
        match self.behaviour {
            Behaviour::FailStop => Err(ClientError::StopFailed {
                message: String::from("recording client refused to stop"),
                source: io::Error::other("stop refused"),
            }),
            Behaviour::Succeed | Behaviour::FailStart(_) => Ok(()),
        }
    }
}

impl Drop for RecordingClient {
    fn drop(&mut self) {
        self.log.with(|state| state.dropped = true);
    }
}

/// Arguments a [`RecordingFactory`] was asked to build a client from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Creation {
    pub(crate) name: String,
    pub(crate) launch: LaunchSpec,
    pub(crate) options: ClientOptions,
    pub(crate) calls: CallLog,
}

/// Factory double producing [`RecordingClient`]s and remembering each request.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingFactory {
    behaviour: Behaviour,
    created: Arc<Mutex<Vec<Creation>>>,
}

impl RecordingFactory {
    pub(crate) fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            created: Arc::default(),
        }
    }

    pub(crate) fn created(&self) -> Vec<Creation> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PartialEq for CallLog {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CallLog {}

impl ClientFactory for RecordingFactory {
    type Client = RecordingClient;

    fn create(&self, name: &str, launch: &LaunchSpec, options: &ClientOptions) -> Self::Client {
        let client = RecordingClient::with_behaviour(self.behaviour);
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Creation {
                name: name.to_owned(),
                launch: launch.clone(),
                options: options.clone(),
                calls: client.calls(),
            });
        client
    }
}

/// Lifecycle events captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReportedEvent {
    ActivationStarting,
    ServerResolved(PathBuf),
    ClientRunning(LaunchSpec),
    ActivationFailed(String),
    DeactivationStarting,
    ClientStopped,
    DeactivationFailed(String),
}

/// Reporter double collecting events in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<ReportedEvent>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<ReportedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: ReportedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn activation_starting(&self) {
        self.push(ReportedEvent::ActivationStarting);
    }

    fn server_resolved(&self, command: &Path) {
        self.push(ReportedEvent::ServerResolved(command.to_path_buf()));
    }

    fn client_running(&self, launch: &LaunchSpec) {
        self.push(ReportedEvent::ClientRunning(launch.clone()));
    }

    fn activation_failed(&self, error: &ActivationError) {
        self.push(ReportedEvent::ActivationFailed(error.to_string()));
    }

    fn deactivation_starting(&self) {
        self.push(ReportedEvent::DeactivationStarting);
    }

    fn client_stopped(&self) {
        self.push(ReportedEvent::ClientStopped);
    }

    fn deactivation_failed(&self, error: &ActivationError) {
        self.push(ReportedEvent::DeactivationFailed(error.to_string()));
    }
}

/// Environment double with fixed variables and a fixed set of files.
#[derive(Debug, Clone, Default)]
pub(crate) struct FixedEnvironment {
    vars: HashMap<String, OsString>,
    files: HashSet<PathBuf>,
}

impl FixedEnvironment {
    pub(crate) fn with_var(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.to_owned(), value.into());
        self
    }

    pub(crate) fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }
}

impl Environment for FixedEnvironment {
    fn var_os(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}
