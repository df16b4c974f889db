//! `Duration` as whole milliseconds, for `#[serde(with = "...")]` fields.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Polling {
//!     #[serde(with = "gatepass_core::serde_millis")]
//!     interval: Duration,
//! }
//!
//! let polling: Polling = serde_json::from_str(r#"{"interval": 1500}"#).unwrap();
//! assert_eq!(polling.interval, Duration::from_millis(1500));
//! ```

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Saturates at `u64::MAX` milliseconds.
pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
