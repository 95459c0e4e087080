//! List-or-wrapped-list normalization.
//!
//! Collection endpoints answer either with a bare JSON array or, when the
//! backend paginates, with `{"count": .., "next": .., "results": [...]}`.
//! Both shapes collapse into one `Vec<T>` here so nothing past the adapter
//! sees the difference.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub fn normalize_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, ApiError> {
    let value: Value = serde_json::from_slice(body)?;
    let records = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("results") {
            Some(results @ Value::Array(_)) => results,
            Some(other) => {
                return Err(ApiError::Decode(format!(
                    "`results` must be an array, got {}",
                    kind_of(&other)
                )));
            }
            None => {
                return Err(ApiError::Decode(
                    "expected an array or an object with `results`".to_string(),
                ));
            }
        },
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list response, got {}",
                kind_of(&other)
            )));
        }
    };
    Ok(serde_json::from_value(records)?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
