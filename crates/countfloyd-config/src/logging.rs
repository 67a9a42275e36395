use std::str::FromStr;

use strum::{Display, EnumString};

/// Output formats the client can use for its own diagnostics.
///
/// The names double as the `-logFormatter` values forwarded to the daemon,
/// so `stdout` is accepted as an alias for the text formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Diagnostics are discarded; only daemon replies reach the terminal.
    #[default]
    Null,
    /// Human-readable single line output.
    #[strum(to_string = "text", serialize = "stdout")]
    Text,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

impl LogFormat {
    /// Resolves a formatter name, treating blank or unknown names as
    /// [`LogFormat::Null`].
    #[must_use]
    pub fn from_formatter_name(name: &str) -> Self {
        Self::from_str(name.trim()).unwrap_or_default()
    }
}
