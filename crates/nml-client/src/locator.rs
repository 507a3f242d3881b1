//! Resolution of the language server executable.
//!
//! By default the server is launched by bare name and the operating system
//! searches `PATH` at spawn time. Developers working on the server point an
//! environment variable at their local build directory instead; when a
//! matching file exists there, its path wins.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use nml_config::{CandidateTemplate, ClientSettings, SERVER_EXECUTABLE};
use tracing::debug;

/// Log target for server resolution.
pub(crate) const LOCATOR_TARGET: &str = "nml_client::locator";

/// Read-only view of the process environment and filesystem.
pub trait Environment {
    /// Returns the value of an environment variable, if set.
    fn var_os(&self, key: &str) -> Option<OsString>;

    /// Returns `true` when `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;
}

/// [`Environment`] backed by the real process environment and filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var_os(&self, key: &str) -> Option<OsString> {
        env::var_os(key)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Locates the server executable, honouring the debug directory override.
#[derive(Debug, Clone)]
pub struct ServerLocator<E = SystemEnvironment> {
    executable: String,
    debug_dir_env_var: String,
    candidates: Vec<CandidateTemplate>,
    exe_suffix: String,
    environment: E,
}

impl ServerLocator<SystemEnvironment> {
    /// Builds a locator over the real environment.
    #[must_use]
    pub fn new(settings: &ClientSettings) -> Self {
        Self::with_environment(settings, SystemEnvironment)
    }
}

impl<E> ServerLocator<E>
where
    E: Environment,
{
    /// Builds a locator over a caller-supplied environment.
    #[must_use]
    pub fn with_environment(settings: &ClientSettings, environment: E) -> Self {
        Self {
            executable: SERVER_EXECUTABLE.to_owned(),
            debug_dir_env_var: settings.debug_dir_env_var.clone(),
            candidates: settings.fallback_candidates.clone(),
            exe_suffix: env::consts::EXE_SUFFIX.to_owned(),
            environment,
        }
    }

    /// Replaces the platform executable suffix (`.exe` on Windows).
    #[must_use]
    pub fn with_exe_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exe_suffix = suffix.into();
        self
    }

    /// Resolves the command used to launch the server.
    ///
    /// Returns the first candidate file inside the debug directory, or the
    /// bare executable name when the variable is unset or nothing matches.
    /// Missing files are never an error.
    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        let Some(dir) = self.debug_dir() else {
            debug!(
                target: LOCATOR_TARGET,
                variable = %self.debug_dir_env_var,
                command = %self.executable,
                "debug directory not set, using bare command"
            );
            return PathBuf::from(&self.executable);
        };

        for candidate in self.candidate_paths(&dir) {
            if self.environment.is_file(&candidate) {
                debug!(
                    target: LOCATOR_TARGET,
                    variable = %self.debug_dir_env_var,
                    candidate = %candidate.display(),
                    "using server from debug directory"
                );
                return candidate;
            }
            debug!(
                target: LOCATOR_TARGET,
                candidate = %candidate.display(),
                "candidate not found"
            );
        }

        debug!(
            target: LOCATOR_TARGET,
            variable = %self.debug_dir_env_var,
            directory = %dir.display(),
            command = %self.executable,
            "no server in debug directory, using bare command"
        );
        PathBuf::from(&self.executable)
    }

    /// Paths probed inside `dir`, in order, without duplicates.
    #[must_use]
    pub fn candidate_paths(&self, dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::with_capacity(self.candidates.len());
        for template in &self.candidates {
            let path = dir.join(template.file_name(&self.executable, &self.exe_suffix));
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    fn debug_dir(&self) -> Option<PathBuf> {
        self.environment
            .var_os(&self.debug_dir_env_var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mockall::mock;
    use mockall::predicate::eq;
    use nml_config::ClientProfile;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    mock! {
        Env {}
        impl Environment for Env {
            fn var_os(&self, key: &str) -> Option<OsString>;
            fn is_file(&self, path: &Path) -> bool;
        }
    }

    #[fixture]
    fn channel() -> ClientSettings {
        ClientProfile::Channel.settings()
    }

    fn env_with_dir(dir: Option<&'static str>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_var_os()
            .with(eq("NML_DEBUG_DIR"))
            .returning(move |_| dir.map(OsString::from));
        env
    }

    #[rstest]
    fn unset_variable_returns_bare_command(channel: ClientSettings) {
        let mut env = env_with_dir(None);
        env.expect_is_file().never();
        let locator = ServerLocator::with_environment(&channel, env);

        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
    }

    #[rstest]
    fn empty_variable_is_treated_as_unset(channel: ClientSettings) {
        let mut env = env_with_dir(Some(""));
        env.expect_is_file().never();
        let locator = ServerLocator::with_environment(&channel, env);

        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
    }

    #[rstest]
    fn finds_windows_build_without_platform_suffix(channel: ClientSettings) {
        let mut env = env_with_dir(Some("/tmp/build"));
        env.expect_is_file()
            .returning(|path| path == Path::new("/tmp/build/nmlc.exe"));
        let locator = ServerLocator::with_environment(&channel, env).with_exe_suffix("");

        assert_eq!(locator.resolve(), PathBuf::from("/tmp/build/nmlc.exe"));
    }

    #[rstest]
    fn prefers_exe_build_in_debug_dir(channel: ClientSettings) {
        let mut env = env_with_dir(Some("/tmp/build"));
        env.expect_is_file()
            .withf(|path| path == Path::new("/tmp/build/nmlc.exe"))
            .returning(|_| true);
        let locator = ServerLocator::with_environment(&channel, env).with_exe_suffix(".exe");

        assert_eq!(locator.resolve(), PathBuf::from("/tmp/build/nmlc.exe"));
    }

    #[rstest]
    fn falls_back_to_bare_name_inside_debug_dir(channel: ClientSettings) {
        let mut env = env_with_dir(Some("/tmp/build"));
        env.expect_is_file()
            .returning(|path| path == Path::new("/tmp/build/nmlc"));
        let locator = ServerLocator::with_environment(&channel, env).with_exe_suffix(".exe");

        assert_eq!(locator.resolve(), PathBuf::from("/tmp/build/nmlc"));
    }

    #[rstest]
    fn trace_profile_does_not_probe_bare_name() {
        let settings = ClientProfile::Trace.settings();
        let mut env = MockEnv::new();
        env.expect_var_os()
            .with(eq("NMLC_DEBUG_DIR"))
            .returning(|_| Some(OsString::from("/tmp/build")));
        env.expect_is_file()
            .withf(|path| path == Path::new("/tmp/build/nmlc.exe"))
            .times(1)
            .returning(|_| false);
        let locator = ServerLocator::with_environment(&settings, env).with_exe_suffix(".exe");

        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
    }

    #[rstest]
    fn missing_candidates_fall_back_on_every_call(channel: ClientSettings) {
        let mut env = env_with_dir(Some("/tmp/build"));
        env.expect_is_file().returning(|_| false);
        let locator = ServerLocator::with_environment(&channel, env).with_exe_suffix(".exe");

        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
    }

    #[rstest]
    fn channel_probes_exe_before_bare_name(channel: ClientSettings) {
        let locator =
            ServerLocator::with_environment(&channel, MockEnv::new()).with_exe_suffix("");

        let candidates = locator.candidate_paths(Path::new("/tmp/build"));

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/tmp/build/nmlc.exe"),
                PathBuf::from("/tmp/build/nmlc")
            ]
        );
    }

    #[rstest]
    fn identical_candidates_are_probed_once() {
        let settings = ClientSettings {
            fallback_candidates: vec![CandidateTemplate::PlatformExecutable, CandidateTemplate::Bare],
            ..ClientProfile::Channel.settings()
        };
        let locator =
            ServerLocator::with_environment(&settings, MockEnv::new()).with_exe_suffix("");

        let candidates = locator.candidate_paths(Path::new("/tmp/build"));

        assert_eq!(candidates, vec![PathBuf::from("/tmp/build/nmlc")]);
    }

    #[rstest]
    fn nonexistent_directory_falls_through(channel: ClientSettings) {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("not-built-yet");
        let mut env = MockEnv::new();
        env.expect_var_os()
            .returning(move |_| Some(missing.clone().into_os_string()));
        env.expect_is_file()
            .returning(|path| SystemEnvironment.is_file(path));
        let locator = ServerLocator::with_environment(&channel, env);

        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
    }

    #[rstest]
    fn directory_named_like_the_server_is_skipped(channel: ClientSettings) {
        let temp = TempDir::new().expect("temp dir");
        fs::create_dir(temp.path().join("nmlc")).expect("create dir");
        let dir = temp.path().to_path_buf();
        let mut env = MockEnv::new();
        env.expect_var_os()
            .returning(move |_| Some(dir.clone().into_os_string()));
        env.expect_is_file()
            .returning(|path| SystemEnvironment.is_file(path));
        let locator = ServerLocator::with_environment(&channel, env).with_exe_suffix("");

        assert_eq!(locator.resolve(), PathBuf::from("nmlc"));
    }

    #[cfg(unix)]
    #[rstest]
    fn non_executable_file_is_still_returned(channel: ClientSettings) {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("temp dir");
        let server = temp.path().join("nmlc");
        fs::write(&server, b"not a binary").expect("write server");
        fs::set_permissions(&server, fs::Permissions::from_mode(0o644)).expect("chmod");
        let dir = temp.path().to_path_buf();
        let mut env = MockEnv::new();
        env.expect_var_os()
            .returning(move |_| Some(dir.clone().into_os_string()));
        env.expect_is_file()
            .returning(|path| SystemEnvironment.is_file(path));
        let locator = ServerLocator::with_environment(&channel, env).with_exe_suffix("");

        assert_eq!(locator.resolve(), server);
    }
}
