use std::fmt;

/// Control verbs understood by the daemon's raw command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlVerb {
    /// Asks the daemon to shut down.
    Quit,
    /// Asks the daemon to describe its state.
    Status,
    /// Asks the daemon about a single feature.
    Query,
}

impl ControlVerb {
    /// The ASCII token for this verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quit => "QUIT",
            Self::Status => "STATUS",
            Self::Query => "QUERY",
        }
    }

    /// Encodes the verb followed by an optional argument.
    #[must_use]
    pub fn encode(self, argument: Option<&str>) -> Vec<u8> {
        encode_raw(self.as_str().as_bytes(), argument.map(str::as_bytes))
    }
}

impl fmt::Display for ControlVerb {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Joins a verb and an optional argument with a single space.
///
/// An empty argument still produces the separator, so `QUERY` with an empty
/// feature name encodes as `QUERY `.
#[must_use]
pub fn encode_raw(verb: &[u8], argument: Option<&[u8]>) -> Vec<u8> {
    let extra = argument.map_or(0, |bytes| bytes.len() + 1);
    let mut encoded = Vec::with_capacity(verb.len() + extra);
    encoded.extend_from_slice(verb);
    if let Some(bytes) = argument {
        encoded.push(b' ');
        encoded.extend_from_slice(bytes);
    }
    encoded
}
