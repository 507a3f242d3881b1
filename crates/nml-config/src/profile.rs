//! Client profiles and the settings they resolve to.
//!
//! Two launch configurations exist for the NML client. They differ in the
//! environment variable pointing at a local build directory, in which file
//! names are probed inside that directory, in the arguments handed to the
//! server, and in whether a trace channel is attached. Rather than picking
//! one, both are kept as named profiles that resolve into a single
//! [`ClientSettings`] value at startup.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Named launch configuration for the language client.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ClientProfile {
    /// `nmlc lsp --channel=stdio`, resolved through `NML_DEBUG_DIR`.
    #[default]
    Channel,
    /// `nmlc lsp --log trace`, resolved through `NMLC_DEBUG_DIR`, with a
    /// trace channel attached.
    Trace,
}

impl ClientProfile {
    /// Environment variable naming the debug build directory for this profile.
    #[must_use]
    pub const fn debug_dir_env_var(self) -> &'static str {
        match self {
            Self::Channel => "NML_DEBUG_DIR",
            Self::Trace => "NMLC_DEBUG_DIR",
        }
    }

    /// File name templates probed inside the debug directory, in order.
    #[must_use]
    pub fn fallback_candidates(self) -> Vec<CandidateTemplate> {
        match self {
            Self::Channel => vec![CandidateTemplate::WindowsExecutable, CandidateTemplate::Bare],
            Self::Trace => vec![CandidateTemplate::PlatformExecutable],
        }
    }

    /// Arguments selecting the server's protocol-serving mode.
    #[must_use]
    pub fn server_args(self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Channel => &["lsp", "--channel=stdio"],
            Self::Trace => &["lsp", "--log", "trace"],
        };
        args.iter().map(|arg| (*arg).to_owned()).collect()
    }

    /// Whether the profile attaches a trace channel to the client.
    #[must_use]
    pub const fn enables_trace_channel(self) -> bool {
        matches!(self, Self::Trace)
    }

    /// Resolves the profile into concrete settings.
    #[must_use]
    pub fn settings(self) -> ClientSettings {
        ClientSettings {
            debug_dir_env_var: self.debug_dir_env_var().to_owned(),
            fallback_candidates: self.fallback_candidates(),
            enable_trace_channel: self.enables_trace_channel(),
            server_args: self.server_args(),
        }
    }
}

/// File name template checked inside the debug directory.
#[derive(
    Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CandidateTemplate {
    /// `<name>` followed by the platform's executable suffix.
    PlatformExecutable,
    /// `<name>.exe`, regardless of platform.
    WindowsExecutable,
    /// `<name>` with no suffix.
    Bare,
}

impl CandidateTemplate {
    /// Renders the file name for `name`, using `exe_suffix` where the
    /// template asks for the platform suffix.
    #[must_use]
    pub fn file_name(self, name: &str, exe_suffix: &str) -> String {
        match self {
            Self::PlatformExecutable => format!("{name}{exe_suffix}"),
            Self::WindowsExecutable => format!("{name}.exe"),
            Self::Bare => name.to_owned(),
        }
    }
}

/// Settings the client bootstrap runs with, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    /// Environment variable holding the debug build directory.
    pub debug_dir_env_var: String,
    /// File name templates probed inside the debug directory, in order.
    pub fallback_candidates: Vec<CandidateTemplate>,
    /// Whether a trace channel is attached to the client.
    pub enable_trace_channel: bool,
    /// Arguments passed to the server executable.
    pub server_args: Vec<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientProfile::default().settings()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn channel_profile_matches_stdio_launch() {
        let settings = ClientProfile::Channel.settings();

        assert_eq!(settings.debug_dir_env_var, "NML_DEBUG_DIR");
        assert_eq!(settings.server_args, vec!["lsp", "--channel=stdio"]);
        assert_eq!(
            settings.fallback_candidates,
            vec![CandidateTemplate::WindowsExecutable, CandidateTemplate::Bare]
        );
        assert!(!settings.enable_trace_channel);
    }

    #[rstest]
    fn trace_profile_attaches_trace_channel() {
        let settings = ClientProfile::Trace.settings();

        assert_eq!(settings.debug_dir_env_var, "NMLC_DEBUG_DIR");
        assert_eq!(settings.server_args, vec!["lsp", "--log", "trace"]);
        assert_eq!(
            settings.fallback_candidates,
            vec![CandidateTemplate::PlatformExecutable]
        );
        assert!(settings.enable_trace_channel);
    }

    #[rstest]
    #[case("channel", ClientProfile::Channel)]
    #[case("TRACE", ClientProfile::Trace)]
    #[case("Trace", ClientProfile::Trace)]
    fn parses_profile_names_case_insensitively(
        #[case] input: &str,
        #[case] expected: ClientProfile,
    ) {
        let parsed = ClientProfile::from_str(input).expect("profile should parse");

        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn rejects_unknown_profile() {
        assert!(ClientProfile::from_str("verbose").is_err());
    }

    #[rstest]
    #[case(CandidateTemplate::PlatformExecutable, ".exe", "nmlc.exe")]
    #[case(CandidateTemplate::PlatformExecutable, "", "nmlc")]
    #[case(CandidateTemplate::WindowsExecutable, "", "nmlc.exe")]
    #[case(CandidateTemplate::Bare, ".exe", "nmlc")]
    fn renders_candidate_file_names(
        #[case] template: CandidateTemplate,
        #[case] suffix: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(template.file_name("nmlc", suffix), expected);
    }
}
