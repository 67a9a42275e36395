use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::WireError;

/// Key naming the action a structured payload requests.
pub const ACTION_KEY: &str = "action";
/// Key carrying the comma-joined feature file list.
pub const FILES_KEY: &str = "files";
/// Key carrying the `apply` count.
pub const META_NUMBER_KEY: &str = "meta.number";
/// Key carrying the comma-joined features for `apply`.
pub const META_FEATURES_KEY: &str = "meta.features";
/// Action value asking the daemon to load feature files.
pub const ACTION_POPULATE_FROM_FILES: &str = "populate_from_files";
/// Action value asking the daemon to apply features.
pub const ACTION_APPLY: &str = "apply";

/// An ordered set of string keys and values.
///
/// Keys keep their insertion order on the wire. Setting a key that already
/// exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredPayload {
    entries: Vec<(String, String)>,
}

impl StructuredPayload {
    /// Creates an empty payload.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Payload asking the daemon to populate itself from feature files.
    #[must_use]
    pub fn populate_from_files(files: &str) -> Self {
        Self::new()
            .with(ACTION_KEY, ACTION_POPULATE_FROM_FILES)
            .with(FILES_KEY, files)
    }

    /// Payload asking the daemon to apply `features` `number` times.
    #[must_use]
    pub fn apply(number: i64, features: &str) -> Self {
        Self::new()
            .with(ACTION_KEY, ACTION_APPLY)
            .with(META_NUMBER_KEY, number.to_string())
            .with(META_FEATURES_KEY, features)
    }

    /// Inserts or replaces `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`StructuredPayload::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Looks up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Serialises the payload to a compact JSON object.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Encode)
    }

    /// Parses a JSON object back into an ordered payload.
    ///
    /// Non-string values are kept as their JSON text.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Decode)
    }
}

impl Serialize for StructuredPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StructuredPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = StructuredPayload;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object of key/value pairs")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut payload = StructuredPayload::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            payload.set(key, text);
        }
        Ok(payload)
    }
}
