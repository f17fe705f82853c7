//! Forgiving field deserializers for cards that were hand-edited, produced by
//! a generator, or written by an older build.
//!
//! Every engine-owned field goes through one of these so that a missing,
//! `null`, or wrongly-typed value degrades to zero/empty/default instead of
//! failing the whole document. Pair each with `#[serde(default)]` so absent
//! keys take the same path.

use crate::types::Status;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value to a finite `f64`. Numeric strings are accepted;
/// anything else, including non-finite results, becomes `0.0`.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    finite_or_zero(n)
}

pub fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = number(deserializer)?;
    if n <= 0.0 {
        return Ok(0);
    }
    Ok(n.min(u32::MAX as f64) as u32)
}

/// Unknown or non-string statuses fall back to `pending`.
pub fn status<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => Status::default(),
    })
}

/// `null` or a non-array becomes an empty list. Malformed elements are still
/// an error: structural validation of children is the caller's job.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// `null` becomes `T::default()`; a wrongly-typed object also falls back to
/// the default since the whole value is engine-derived.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// `null` becomes `T::default()`; any other value must parse as `T`. For
/// user-authored collections where a typo should still be reported.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
