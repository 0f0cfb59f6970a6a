//! Serde adapter for RFC 3339 timestamps with whole-second precision.
//!
//! Parsing accepts any RFC 3339 string, including fractional seconds and
//! numeric offsets. Serialization always emits UTC with a `Z` suffix and
//! no fractional part.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Formats a timestamp the way token claims carry it.
#[must_use]
pub fn format(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serializes a timestamp as an RFC 3339 string.
///
/// # Errors
///
/// Propagates errors from the underlying serializer.
pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(time))
}

/// Deserializes an RFC 3339 string into a UTC timestamp.
///
/// # Errors
///
/// Fails if the value is not a string or not a valid RFC 3339 timestamp.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| serde::de::Error::custom(format!("invalid RFC 3339 timestamp '{s}': {e}")))
}
