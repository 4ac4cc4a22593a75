//! ISO-8601 timestamps with millisecond precision.
//!
//! Persisted form is `YYYY-MM-DDTHH:MM:SS.mmmZ`. Values are truncated to
//! milliseconds on creation so a write/read cycle reproduces them exactly.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

pub type Timestamp = DateTime<Utc>;

/// Current UTC time truncated to milliseconds.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Truncates an arbitrary timestamp to persisted precision.
pub fn truncate(value: Timestamp) -> Timestamp {
    value.trunc_subsecs(3)
}

pub fn to_iso(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses any RFC 3339 timestamp and normalizes it to UTC.
pub fn parse_iso(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|parsed| parsed.with_timezone(&Utc))
}

/// Serde adapter for `Timestamp` fields.
pub mod iso_millis {
    use super::{parse_iso, to_iso, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_iso(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{now, parse_iso, to_iso};

    #[test]
    fn formats_with_millis_and_zulu_suffix() {
        let value = parse_iso("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(to_iso(&value), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn parse_normalizes_offsets_to_utc() {
        let value = parse_iso("2024-01-01T02:30:00.250+02:00").unwrap();
        assert_eq!(to_iso(&value), "2024-01-01T00:30:00.250Z");
    }

    #[test]
    fn now_survives_text_roundtrip() {
        let value = now();
        assert_eq!(parse_iso(&to_iso(&value)).unwrap(), value);
    }
}
