//! JSON bytes → Store.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::{Mapping, Store, Value, MAX_DEPTH};

use super::error::JsonError;

/// Reads a JSON object into a [`Store`].
///
/// Nested objects become [`Value::Store`]; integers that fit `i64` become
/// [`Value::Int`], every other number [`Value::Float`]. Documents are
/// accepted up to the same nesting depth [`JsonEncoder`](super::JsonEncoder)
/// writes.
#[derive(Debug, Default, Clone)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Result<Store, JsonError> {
        check_nesting(bytes)?;
        // Depth is bounded by `check_nesting`, so serde_json's own limit of
        // 128 would only reject documents the encoder produced.
        let mut de = serde_json::Deserializer::from_slice(bytes);
        de.disable_recursion_limit();
        let root = JsonValue::deserialize(&mut de)?;
        de.end()?;
        self.from_json(root)
    }

    /// Converts an already-parsed `serde_json` tree.
    pub fn from_json(&self, root: JsonValue) -> Result<Store, JsonError> {
        match root {
            JsonValue::Object(object) => object_to_store(object, 0),
            other => Err(JsonError::RootNotObject(json_kind(&other))),
        }
    }
}

/// Rejects documents with more nested brackets than an encoded store can
/// have, before the recursive parser sees them.
fn check_nesting(bytes: &[u8]) -> Result<(), JsonError> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                // The root object is one level above its entries.
                if depth > MAX_DEPTH + 1 {
                    return Err(JsonError::TooDeep(MAX_DEPTH));
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn object_to_store(
    object: serde_json::Map<String, JsonValue>,
    depth: usize,
) -> Result<Store, JsonError> {
    let mut entries = Mapping::with_capacity(object.len());
    for (key, value) in object {
        entries.insert(key, json_to_value(value, depth + 1)?);
    }
    Ok(Store::from(entries))
}

/// Mirrors the encoder's depth accounting: entries of the root are at
/// depth 1 and every container adds one.
fn json_to_value(value: JsonValue, depth: usize) -> Result<Value, JsonError> {
    if depth > MAX_DEPTH {
        return Err(JsonError::TooDeep(MAX_DEPTH));
    }
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if n.is_u64() {
                return Err(JsonError::IntegerOutOfRange(n.to_string()));
            } else {
                // Finite by construction; serde_json rejects NaN/inf literals.
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => Value::Text(s),
        JsonValue::Array(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| json_to_value(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(object) => Value::Store(object_to_store(object, depth)?),
    })
}
