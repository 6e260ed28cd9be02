//! Log record formats accepted by `--log-format` and `JOYRIDE_LOG_FORMAT`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How harness and probe log records are rendered on stderr.
///
/// Names parse case-insensitively, so `JSON` and `json` select the same
/// format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per record, for CI runners that collect logs.
    Json,
    /// Single-line text for a developer terminal.
    #[default]
    Compact,
}

impl LogFormat {
    /// Whether records are machine-readable.
    ///
    /// Structured output never carries ANSI colour codes, even on a terminal.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when a format name is not recognised.
pub type LogFormatParseError = strum::ParseError;
