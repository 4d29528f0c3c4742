//! Forgiving `deserialize_with` helpers for boundary records.
//!
//! Source payloads are loosely typed: postcodes arrive as numbers or strings,
//! ages as integers, floats or numeric strings, nested objects are sometimes
//! missing or null. Every helper here absorbs a shape mismatch into `None`
//! instead of failing the surrounding record.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Render a JSON scalar as a string. Blank strings count as absent.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Interpret a JSON value as a whole number. Non-integral floats, values
/// outside the `i64` range and non-numeric strings yield `None`.
pub(crate) fn value_to_integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) if n.is_u64() => n.as_u64().and_then(|u| i64::try_from(u).ok()),
    Value::Number(n) => n.as_i64().or_else(|| {
      n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
    }),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

pub(crate) fn string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(d)?;
  Ok(value.as_ref().and_then(scalar_to_string))
}

pub(crate) fn string_or_empty<'de, D>(d: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(string(d)?.unwrap_or_default())
}

pub(crate) fn integer<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(d)?;
  Ok(value.as_ref().and_then(value_to_integer))
}

pub(crate) fn flag<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(d)?;
  Ok(match value {
    Some(Value::Bool(b)) => Some(b),
    Some(Value::String(s)) => s.trim().parse().ok(),
    _ => None,
  })
}

/// Deserialise a nested object, treating anything that does not fit `T` as
/// absent.
pub(crate) fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<Value>::deserialize(d)?;
  Ok(
    value
      .filter(Value::is_object)
      .and_then(|v| serde_json::from_value(v).ok()),
  )
}
