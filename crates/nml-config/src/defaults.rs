use crate::logging::LogFormat;
use crate::profile::ClientProfile;

/// Name of the language server executable, without any platform suffix.
pub const SERVER_EXECUTABLE: &str = "nmlc";

/// Language identifier the client serves.
pub const LANGUAGE_ID: &str = "nml";

/// Name the extension registers its client and trace channel under.
pub const EXTENSION_NAME: &str = "nml";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default client profile.
#[must_use]
pub const fn default_profile() -> ClientProfile {
    ClientProfile::Channel
}
