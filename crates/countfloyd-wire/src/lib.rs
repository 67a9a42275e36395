//! Wire payloads exchanged between `cfc` and the countfloyd daemon.
//!
//! Control verbs travel as bare ASCII tokens, optionally followed by a single
//! argument. Structured actions travel as an ordered key/value container
//! serialised to a compact JSON object.

mod structured;
mod verb;

use thiserror::Error;

pub use structured::{
    ACTION_APPLY, ACTION_KEY, ACTION_POPULATE_FROM_FILES, FILES_KEY, META_FEATURES_KEY,
    META_NUMBER_KEY, StructuredPayload,
};
pub use verb::{ControlVerb, encode_raw};

/// A message ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Literal bytes, typically a control verb and its argument.
    Raw(Vec<u8>),
    /// An ordered key/value container describing a structured action.
    Structured(StructuredPayload),
}

impl Payload {
    /// Builds a raw payload from a control verb and an optional argument.
    #[must_use]
    pub fn control(verb: ControlVerb, argument: Option<&str>) -> Self {
        Self::Raw(verb.encode(argument))
    }

    /// Produces the immutable byte sequence sent to the daemon.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        match self {
            Self::Raw(bytes) => Ok(bytes.clone()),
            Self::Structured(payload) => payload.encode(),
        }
    }
}

impl From<StructuredPayload> for Payload {
    fn from(payload: StructuredPayload) -> Self {
        Self::Structured(payload)
    }
}

/// Errors raised while encoding or decoding payloads.
#[derive(Debug, Error)]
pub enum WireError {
    /// The structured payload could not be serialised.
    #[error("failed to encode structured payload: {0}")]
    Encode(#[source] serde_json::Error),
    /// The bytes did not describe a structured payload.
    #[error("failed to decode structured payload: {0}")]
    Decode(#[source] serde_json::Error),
}
