// Convert exchange wire values into canonical units.
// Prices/sizes arrive either as JSON numbers or as decimal strings;
// timestamps as ISO-8601 strings or epoch seconds.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NormaliseError {
    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("not a finite number: {0}")]
    NotFinite(f64),

    #[error("not a timestamp: {0:?}")]
    BadTimestamp(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// A numeric field that some exchanges send as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn to_f64(&self) -> Result<f64, NormaliseError> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| NormaliseError::NotANumber(s.clone()))?,
        };
        if value.is_finite() { Ok(value) } else { Err(NormaliseError::NotFinite(value)) }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Number(value)
    }
}

/// ISO-8601 UTC timestamp (e.g. `2017-09-14T19:23:53.123000Z`) to epoch seconds.
pub fn iso_to_epoch_seconds(s: &str) -> Result<f64, NormaliseError> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ"))
        .map_err(|_| NormaliseError::BadTimestamp(s.to_string()))?;
    let utc = parsed.and_utc();
    Ok(utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) / 1_000_000.0)
}

/// Exchange-native epoch seconds, passed through unchanged.
pub fn epoch_seconds(value: &Numeric) -> Result<f64, NormaliseError> {
    value
        .to_f64()
        .map_err(|_| NormaliseError::BadTimestamp(format!("{:?}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_from_number_or_string() {
        assert_eq!(Numeric::Number(1.5).to_f64(), Ok(1.5));
        assert_eq!(Numeric::Text("0.00012".into()).to_f64(), Ok(0.00012));
        assert_eq!(Numeric::Text(" 42 ".into()).to_f64(), Ok(42.0));
        assert!(Numeric::Text("abc".into()).to_f64().is_err());
        assert!(Numeric::Text("NaN".into()).to_f64().is_err());
    }

    #[test]
    fn test_numeric_deserialises_both_shapes() {
        let values: Vec<Numeric> = serde_json::from_str(r#"[1.25, "2.5"]"#).unwrap();
        assert_eq!(values[0].to_f64(), Ok(1.25));
        assert_eq!(values[1].to_f64(), Ok(2.5));
    }

    #[test]
    fn test_iso_timestamps() {
        assert_eq!(iso_to_epoch_seconds("1970-01-01T00:00:10.500000Z"), Ok(10.5));
        assert_eq!(iso_to_epoch_seconds("2017-09-14T19:23:53.000Z"), Ok(1_505_417_033.0));
        assert!(iso_to_epoch_seconds("yesterday").is_err());
    }

    #[test]
    fn test_epoch_passthrough() {
        assert_eq!(epoch_seconds(&Numeric::Text("1505417033.5".into())), Ok(1_505_417_033.5));
    }
}
