//! The stored value model.
//!
//! Values are persisted as text. Strings are stored verbatim; everything
//! else is serialized to JSON. On read the stored text is resolved back by
//! attempting a JSON decode first and degrading to raw text on failure, so
//! plain-string writes and structured writes round-trip transparently.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value as it exists in storage: either raw text or structured JSON.
///
/// The two-way fallback is deliberate: no attempt is made to guess the
/// original type beyond "parses as JSON" versus "does not".
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Raw text, stored and returned verbatim.
    Text(String),
    /// Structured data, persisted as its JSON serialization.
    Json(serde_json::Value),
}

impl StoredValue {
    /// Build a stored value from any serializable input.
    ///
    /// Strings become [`StoredValue::Text`] so they are persisted verbatim;
    /// all other inputs become [`StoredValue::Json`].
    ///
    /// # Errors
    ///
    /// Returns an error if `value` fails to serialize.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::to_value(value)? {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        })
    }

    /// Resolve persisted text back into a stored value.
    ///
    /// Attempts a JSON decode first; text that does not parse is returned
    /// unchanged as [`StoredValue::Text`]. This is not an error path.
    #[must_use]
    pub fn decode(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(json) => Self::Json(json),
            Err(_) => Self::Text(text.to_owned()),
        }
    }

    /// The text form this value is persisted as.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(json) => json.to_string(),
        }
    }

    /// Convert into a typed value.
    ///
    /// Raw text converts through a JSON string, so `into_typed::<String>()`
    /// on a `Text` value returns the text itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not deserialize into `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        let json = match self {
            Self::Json(json) => json,
            Self::Text(text) => serde_json::Value::String(text),
        };
        serde_json::from_value(json)
    }

    /// Borrow the structured form, if this value is structured.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(json) => Some(json),
            Self::Text(_) => None,
        }
    }

    /// Borrow the raw text form, if this value is raw text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for StoredValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for StoredValue {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
