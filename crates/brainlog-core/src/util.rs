//! Shared utility functions used across multiple modules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Current Unix timestamp in milliseconds.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Deserialize a JSON `null` as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each element of a JSON array on its own.
///
/// Elements that fail to decode are logged with `what` and handed back
/// untouched next to the decoded records.
pub fn decode_each<T: DeserializeOwned>(
    values: Vec<serde_json::Value>,
    what: &str,
) -> (Vec<T>, Vec<serde_json::Value>) {
    let mut decoded = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    for value in values {
        match T::deserialize(&value) {
            Ok(record) => decoded.push(record),
            Err(error) => {
                tracing::warn!("Skipping malformed {}: {}", what, error);
                rejected.push(value);
            }
        }
    }
    (decoded, rejected)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMillis {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Deserialize a note timestamp into Unix milliseconds.
///
/// Notes carry raw numbers, but older snapshots and hand-edited rows may hold
/// numeric strings or RFC 3339 timestamps. Anything unparsable maps to 0 so
/// the record loses every comparison instead of failing the whole list.
pub fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawMillis>::deserialize(deserializer)?;
    Ok(raw.map_or(0, |raw| match raw {
        RawMillis::Int(value) => value,
        #[allow(clippy::cast_possible_truncation)]
        RawMillis::Float(value) => value as i64,
        RawMillis::Text(text) => parse_millis(&text).unwrap_or(0),
    }))
}

/// Parse a textual timestamp (integer millis or RFC 3339) into Unix millis.
pub fn parse_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    chrono::DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|timestamp| timestamp.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, deserialize_with = "deserialize_millis")]
        at: i64,
    }

    fn stamped(json: &str) -> i64 {
        serde_json::from_str::<Stamped>(json).unwrap().at
    }

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" https://example.com ".to_string())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn millis_accepts_numbers_and_strings() {
        assert_eq!(stamped(r#"{"at": 1700000000123}"#), 1_700_000_000_123);
        assert_eq!(stamped(r#"{"at": 1700000000123.0}"#), 1_700_000_000_123);
        assert_eq!(stamped(r#"{"at": "1700000000123"}"#), 1_700_000_000_123);
        assert_eq!(
            stamped(r#"{"at": "2023-11-14T22:13:20.123Z"}"#),
            1_700_000_000_123
        );
    }

    #[test]
    fn millis_falls_back_to_epoch_zero() {
        assert_eq!(stamped(r#"{"at": null}"#), 0);
        assert_eq!(stamped(r#"{"at": "yesterday"}"#), 0);
        assert_eq!(stamped("{}"), 0);
    }
}
