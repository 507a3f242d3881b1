//! Log record formatting options.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the binary renders log records on standard error.
///
/// Parsed case-insensitively from configuration files, `NML_LOG_FORMAT` and
/// `--log-format`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per record, fields flattened.
    Json,
    /// Single-line text records for reading in an editor's output pane.
    #[default]
    Compact,
}

impl LogFormat {
    /// Whether records are machine-readable.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}
