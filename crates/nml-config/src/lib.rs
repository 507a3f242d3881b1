//! Shared configuration for the NML language client.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an
//! `nml.toml` file (located via `--config-path` or `NML_CONFIG_PATH`), then
//! `NML_*` environment variables, then command-line flags. The loaded
//! [`Config`] resolves into [`ClientSettings`], the single value the client
//! bootstrap consults when locating and launching the server.

mod defaults;
mod logging;
mod profile;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, EXTENSION_NAME, LANGUAGE_ID, SERVER_EXECUTABLE,
    default_log_filter_string, default_log_format, default_profile,
};
pub use logging::LogFormat;
pub use profile::{CandidateTemplate, ClientProfile, ClientSettings};

/// Configuration for the NML client binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NML")]
pub struct Config {
    /// Filter expression applied to the tracing subscriber.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Launch profile selecting server arguments and resolution rules.
    #[serde(default = "default_profile")]
    #[ortho_config(default = default_profile())]
    pub profile: ClientProfile,
    /// Overrides the environment variable consulted for the debug directory.
    #[serde(default)]
    pub debug_dir_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            profile: default_profile(),
            debug_dir_env: None,
        }
    }
}

impl Config {
    /// Filter expression applied to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Launch profile in effect.
    #[must_use]
    pub const fn profile(&self) -> ClientProfile {
        self.profile
    }

    /// Resolves the unified client settings for the selected profile.
    ///
    /// An explicit `debug_dir_env` replaces the profile's variable name; all
    /// other settings come from the profile.
    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        let mut settings = self.profile.settings();
        if let Some(key) = self
            .debug_dir_env
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            key.clone_into(&mut settings.debug_dir_env_var);
        }
        settings
    }
}
