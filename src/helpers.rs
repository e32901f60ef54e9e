//! Formatting and Parsing Helpers

use crate::Result;
use anyhow::anyhow;
use chrono::{Local, TimeZone};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Layout used by [`format_date`]
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format seconds since the Unix epoch as `YYYY-MM-DD HH:MM:SS` in local time
pub fn format_date(timestamp: i64) -> Result<String> {
    let datetime = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| anyhow!("Timestamp {} is out of range", timestamp))?;

    Ok(datetime.format(DATE_FORMAT).to_string())
}

/// Parse a JSON document, returning `None` when the input is malformed
pub fn parse_json(data: &str) -> Option<Value> {
    parse_json_as(data)
}

/// Parse a JSON document into `T`, returning `None` when the input is
/// malformed or does not match the target shape
pub fn parse_json_as<T: DeserializeOwned>(data: &str) -> Option<T> {
    match serde_json::from_str(data) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding unparseable JSON input: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_format_date_layout() {
        let formatted = format_date(1_700_000_000).unwrap();

        assert_eq!(formatted.len(), 19);
        assert!(NaiveDateTime::parse_from_str(&formatted, DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_format_date_matches_local_time() {
        let expected = Local
            .timestamp_opt(86_400, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        assert_eq!(format_date(86_400).unwrap(), expected);
    }

    #[test]
    fn test_format_date_out_of_range() {
        assert!(format_date(i64::MAX).is_err());
    }

    #[test]
    fn test_parse_json_object() {
        assert_eq!(parse_json(r#"{"a":1}"#), Some(json!({ "a": 1 })));
    }

    #[test]
    fn test_parse_json_malformed() {
        assert_eq!(parse_json("{not json"), None);
        assert_eq!(parse_json(""), None);
    }

    #[test]
    fn test_parse_json_scalars() {
        assert_eq!(parse_json("null"), Some(Value::Null));
        assert_eq!(parse_json("[1, 2]"), Some(json!([1, 2])));
    }

    #[test]
    fn test_parse_json_as_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        assert_eq!(
            parse_json_as::<Point>(r#"{"x": 3, "y": -4}"#),
            Some(Point { x: 3, y: -4 })
        );
        assert_eq!(parse_json_as::<Point>(r#"{"x": 3}"#), None);
    }
}
