//! Store → JSON bytes.

use serde_json::{Map, Number, Value as JsonValue};

use crate::text::{binary_to_text, date_to_text};
use crate::{Store, Value, MAX_DEPTH};

use super::error::JsonError;

/// Writes a [`Store`] as a JSON object.
#[derive(Debug, Default, Clone)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&mut self, store: &Store, pretty: bool) -> Result<Vec<u8>, JsonError> {
        let root = store_to_json(store, 0)?;
        let bytes = if pretty {
            serde_json::to_vec_pretty(&root)?
        } else {
            serde_json::to_vec(&root)?
        };
        Ok(bytes)
    }

    /// Converts a store into a `serde_json` tree without serializing it.
    pub fn to_json(&self, store: &Store) -> Result<JsonValue, JsonError> {
        store_to_json(store, 0)
    }
}

fn store_to_json(store: &Store, depth: usize) -> Result<JsonValue, JsonError> {
    let mut object = Map::with_capacity(store.len());
    for (key, value) in store {
        object.insert(key.clone(), value_to_json(value, depth + 1)?);
    }
    Ok(JsonValue::Object(object))
}

fn value_to_json(value: &Value, depth: usize) -> Result<JsonValue, JsonError> {
    if depth > MAX_DEPTH {
        return Err(JsonError::TooDeep(MAX_DEPTH));
    }
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => {
            JsonValue::Number(Number::from_f64(*f).ok_or(JsonError::NonFiniteFloat(*f))?)
        }
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Binary(bytes) => JsonValue::String(binary_to_text(bytes)),
        Value::Date(date) => JsonValue::String(date_to_text(date)),
        Value::Decimal(decimal) => JsonValue::String(decimal.to_string()),
        Value::Store(store) => store_to_json(store, depth)?,
        Value::Sequence(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| value_to_json(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, item) in map {
                object.insert(key.clone(), value_to_json(item, depth + 1)?);
            }
            JsonValue::Object(object)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn compact_output_keeps_insertion_order() {
        let mut store = Store::new();
        store.set("id", 7i64);
        store.set("name", "Ada");
        let bytes = JsonEncoder::new().encode(&store, false).unwrap();
        assert_eq!(bytes, br#"{"id":7,"name":"Ada"}"#);
    }

    #[test]
    fn fallbacks_are_text() {
        let mut store = Store::new();
        store.set("data", vec![1u8, 2, 3]);
        store.set("when", Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap());
        store.set("price", "19.99".parse::<crate::Decimal>().unwrap());
        let tree = JsonEncoder::new().to_json(&store).unwrap();
        assert_eq!(
            tree,
            json!({"data": "AQID", "when": "2020-01-02T03:04:05Z", "price": "19.99"})
        );
    }

    #[test]
    fn non_finite_float_fails() {
        let mut store = Store::new();
        store.set("x", f64::INFINITY);
        assert!(matches!(
            JsonEncoder::new().encode(&store, true),
            Err(JsonError::NonFiniteFloat(_))
        ));
    }
}
