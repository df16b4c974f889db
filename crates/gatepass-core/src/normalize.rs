//! Scan value normalization.
//!
//! Decoders hand over either a plain decoded string or a richer result object
//! depending on the call site. Both converge here to one canonical, trimmed
//! credential string so that verification downstream does not depend on which
//! decoder path produced the value.
//!
//! # Resolution Order
//!
//! 1. A string payload is trimmed and used directly.
//! 2. A structured payload yields its `decodedText` field, else its `text`
//!    field, else its JSON serialization; the result is trimmed.
//! 3. Anything else is coerced to its string form and trimmed (null becomes `""`).
//!
//! Normalization never fails. An empty result means the scan carried nothing
//! usable and must be treated as invalid input by the caller.
//!
//! # Examples
//!
//! ```
//! use gatepass_core::{RawScanPayload, normalize};
//! use serde_json::json;
//!
//! let plain = RawScanPayload::from("  EMP_3_abc\n");
//! let object = RawScanPayload::from(json!({ "decodedText": "EMP_3_abc " }));
//!
//! assert_eq!(normalize(&plain), "EMP_3_abc");
//! assert_eq!(normalize(&plain), normalize(&object));
//! ```

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Structured fields consulted, in order, before falling back to serialization.
const TEXT_FIELDS: [&str; 2] = ["decodedText", "text"];

/// A raw value produced by the decoder for one scan event.
///
/// Transient: created per detection and consumed by [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawScanPayload {
    /// Plain decoded text.
    Text(String),

    /// Decoder result object, possibly carrying `decodedText` or `text`.
    Structured(Map<String, Value>),

    /// Null or missing payload.
    Empty,

    /// Any other scalar or array value.
    Other(Value),
}

impl RawScanPayload {
    /// Returns `true` if the payload carries no value at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, RawScanPayload::Empty)
    }
}

impl From<Value> for RawScanPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => RawScanPayload::Text(text),
            Value::Object(map) => RawScanPayload::Structured(map),
            Value::Null => RawScanPayload::Empty,
            other => RawScanPayload::Other(other),
        }
    }
}

impl From<&str> for RawScanPayload {
    fn from(text: &str) -> Self {
        RawScanPayload::Text(text.to_string())
    }
}

impl From<String> for RawScanPayload {
    fn from(text: String) -> Self {
        RawScanPayload::Text(text)
    }
}

impl<T: Into<RawScanPayload>> From<Option<T>> for RawScanPayload {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawScanPayload::Empty, Into::into)
    }
}

/// Convert a raw decoder payload into its canonical credential string.
///
/// Pure and infallible; returns an empty string when nothing usable is present.
#[must_use]
pub fn normalize(raw: &RawScanPayload) -> String {
    match raw {
        RawScanPayload::Text(text) => text.trim().to_string(),
        RawScanPayload::Structured(map) => structured_text(map).trim().to_string(),
        RawScanPayload::Empty => String::new(),
        RawScanPayload::Other(Value::String(text)) => text.trim().to_string(),
        RawScanPayload::Other(Value::Null) => String::new(),
        RawScanPayload::Other(value) => value.to_string().trim().to_string(),
    }
}

fn structured_text(map: &Map<String, Value>) -> Cow<'_, str> {
    for field in TEXT_FIELDS {
        if let Some(Value::String(text)) = map.get(field)
            && !text.is_empty()
        {
            return Cow::Borrowed(text.as_str());
        }
    }

    Cow::Owned(serde_json::to_string(map).unwrap_or_default())
}
