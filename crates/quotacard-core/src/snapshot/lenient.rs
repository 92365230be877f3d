//! Field decoders that never fail.
//!
//! Each helper takes whatever JSON value sits in the field and maps it to a
//! best-effort typed value, or `None` when nothing sensible can be extracted.
//! Presence follows JavaScript truthiness, which is what the collector's other
//! consumers assume.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Nested object. `null`/falsy values are absent, other non-objects are
/// present with every field absent.
pub(crate) fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Object(_) => Some(T::deserialize(value).unwrap_or_default()),
        ref other if is_truthy(other) => Some(T::default()),
        _ => None,
    })
}

/// Array of objects. Anything else is an empty list.
pub(crate) fn sequence<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| T::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// Number, or a string holding one.
pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(as_number(&Value::deserialize(d)?))
}

/// Integer (fractional input is rounded).
pub(crate) fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(as_number(&Value::deserialize(d)?).map(|n| n.round() as i64))
}

/// Non-empty string. Numbers are stringified.
pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Provider message (`error`, `detail`). Falsy values are absent; other
/// scalars are kept as their display text, so `true` reads "true".
pub(crate) fn message<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        ref v if !is_truthy(v) => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Model label, falling back to "Unknown".
pub(crate) fn label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(string(d)?.unwrap_or_else(|| "Unknown".to_string()))
}

/// ISO-8601 timestamp. Unparseable values are absent.
pub(crate) fn timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as local time.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
