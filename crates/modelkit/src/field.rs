//! Conversion between Rust field types and store [`Value`]s.
//!
//! [`FieldValue::from_value`] is where the declared fallback
//! representations are accepted back: base64 text for binary payloads,
//! RFC 3339 text for dates, text or numbers for decimals. Numbers widen
//! freely (`Int` to `Float`) but never narrow: integer fields read only
//! `Int`, except `u64`/`usize` values past `i64::MAX`, which are stored as
//! decimals and come back from JSON as text.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use modelkit_pack::text::{binary_from_text, date_from_text};
use modelkit_pack::{Decimal, Mapping, Store, Value, ValueKind};

use crate::path::{KeyPath, PathSegment};

/// A stored value that could not be read as the declared field type.
///
/// `at` is relative to the field: empty for the field itself, or the
/// position of the offending element inside a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub expected: ValueKind,
    pub found: ValueKind,
    pub at: KeyPath,
}

impl FieldMismatch {
    pub fn new(expected: ValueKind, found: ValueKind) -> Self {
        Self {
            expected,
            found,
            at: KeyPath::root(),
        }
    }

    /// Reports `value` as not convertible to `T`.
    pub fn of<T: FieldValue>(value: &Value) -> Self {
        Self::new(T::kind(), value.kind())
    }

    #[must_use]
    fn within(mut self, segment: PathSegment) -> Self {
        self.at.push_front(segment);
        self
    }
}

/// A type that can be stored as a single field.
///
/// Implemented for `bool`, the integer types (except `u8`, so that
/// `Vec<u8>` means a binary payload), `f32`/`f64`, `String`, `Vec<u8>`,
/// `DateTime<Utc>`, [`Decimal`], [`Store`], [`Value`] (any variant), and
/// for sequences and string-keyed maps of any of these.
pub trait FieldValue: Sized {
    /// Kind reported in type-mismatch diagnostics.
    fn kind() -> ValueKind;
    fn from_value(value: &Value) -> Result<Self, FieldMismatch>;
    fn to_value(&self) -> Value;
}

impl FieldValue for bool {
    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        value.as_bool().ok_or_else(|| FieldMismatch::of::<Self>(value))
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Parses decimal or text storage of an unsigned value that does not fit `i64`.
/// Anything that would fit is always stored as `Int`, so other spellings are
/// mismatches.
fn wide_unsigned(value: &Value) -> Option<u64> {
    let text = match value {
        Value::Decimal(d) => d.as_str(),
        Value::Text(s) => s.as_str(),
        _ => return None,
    };
    text.parse::<u64>().ok().filter(|n| i64::try_from(*n).is_err())
}

macro_rules! integer_field {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            fn kind() -> ValueKind {
                ValueKind::Int
            }

            fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
                match value {
                    Value::Int(i) => <$t>::try_from(*i).ok(),
                    _ => None,
                }
                .ok_or_else(|| FieldMismatch::of::<Self>(value))
            }

            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        }
    )*};
}

integer_field!(i8, i16, i32, i64, u16, u32);

macro_rules! wide_integer_field {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            fn kind() -> ValueKind {
                ValueKind::Int
            }

            fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
                let converted = match value {
                    Value::Int(i) => <$t>::try_from(*i).ok(),
                    // Values beyond the i64 range are stored as decimal text.
                    other => wide_unsigned(other).and_then(|n| <$t>::try_from(n).ok()),
                };
                converted.ok_or_else(|| FieldMismatch::of::<Self>(value))
            }

            fn to_value(&self) -> Value {
                match i64::try_from(*self) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::Decimal(Decimal::from_i128(*self as i128)),
                }
            }
        }
    )*};
}

wide_integer_field!(u64, usize);

impl FieldValue for f64 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(FieldMismatch::of::<Self>(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FieldValue for f32 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        let wide = f64::from_value(value)?;
        let narrow = wide as f32;
        if wide.is_finite() && narrow.is_infinite() {
            return Err(FieldMismatch::of::<Self>(value));
        }
        Ok(narrow)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FieldValue for String {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| FieldMismatch::of::<Self>(value))
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for Vec<u8> {
    fn kind() -> ValueKind {
        ValueKind::Binary
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        match value {
            Value::Binary(bytes) => Ok(bytes.clone()),
            Value::Text(text) => binary_from_text(text).ok_or_else(|| FieldMismatch::of::<Self>(value)),
            _ => Err(FieldMismatch::of::<Self>(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Binary(self.clone())
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> ValueKind {
        ValueKind::Date
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        match value {
            Value::Date(date) => Ok(*date),
            Value::Text(text) => date_from_text(text).ok_or_else(|| FieldMismatch::of::<Self>(value)),
            _ => Err(FieldMismatch::of::<Self>(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FieldValue for Decimal {
    fn kind() -> ValueKind {
        ValueKind::Decimal
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        let converted = match value {
            Value::Decimal(d) => Some(d.clone()),
            Value::Text(text) => text.parse().ok(),
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Float(f) => Decimal::from_f64(*f),
            _ => None,
        };
        converted.ok_or_else(|| FieldMismatch::of::<Self>(value))
    }

    fn to_value(&self) -> Value {
        Value::Decimal(self.clone())
    }
}

impl FieldValue for Store {
    fn kind() -> ValueKind {
        ValueKind::Store
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        match value {
            Value::Store(store) => Ok(store.clone()),
            Value::Mapping(map) => Ok(Store::from(map.clone())),
            _ => Err(FieldMismatch::of::<Self>(value)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Store(self.clone())
    }
}

/// Any stored value, kept as-is.
impl FieldValue for Value {
    fn kind() -> ValueKind {
        ValueKind::Any
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        Ok(value.clone())
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::Sequence
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        let items = value
            .as_sequence()
            .ok_or_else(|| FieldMismatch::of::<Self>(value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_value(item).map_err(|m| m.within(PathSegment::Index(index)))
            })
            .collect()
    }

    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(T::to_value).collect())
    }
}

fn entries_from_value<T: FieldValue, C: FromIterator<(String, T)>>(
    value: &Value,
    expected: ValueKind,
) -> Result<C, FieldMismatch> {
    let entries = value
        .as_entries()
        .ok_or_else(|| FieldMismatch::new(expected, value.kind()))?;
    entries
        .iter()
        .map(|(key, item)| {
            T::from_value(item)
                .map(|v| (key.clone(), v))
                .map_err(|m| m.within(PathSegment::Key(key.clone())))
        })
        .collect()
}

fn entries_to_value<'a, T: FieldValue + 'a>(entries: impl Iterator<Item = (&'a String, &'a T)>) -> Value {
    Value::Mapping(
        entries
            .map(|(key, item)| (key.clone(), item.to_value()))
            .collect::<Mapping>(),
    )
}

impl<T: FieldValue, S: BuildHasher + Default> FieldValue for IndexMap<String, T, S> {
    fn kind() -> ValueKind {
        ValueKind::Mapping
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        entries_from_value(value, Self::kind())
    }

    fn to_value(&self) -> Value {
        entries_to_value(self.iter())
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn kind() -> ValueKind {
        ValueKind::Mapping
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        entries_from_value(value, Self::kind())
    }

    fn to_value(&self) -> Value {
        entries_to_value(self.iter())
    }
}

/// Written in key order so the output does not depend on hashing.
impl<T: FieldValue, S: BuildHasher + Default> FieldValue for HashMap<String, T, S> {
    fn kind() -> ValueKind {
        ValueKind::Mapping
    }

    fn from_value(value: &Value) -> Result<Self, FieldMismatch> {
        entries_from_value(value, Self::kind())
    }

    fn to_value(&self) -> Value {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries_to_value(entries.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integers_narrow_with_range_checks() {
        assert_eq!(i16::from_value(&Value::Int(300)), Ok(300));
        assert!(i8::from_value(&Value::Int(300)).is_err());
        assert!(u32::from_value(&Value::Int(-1)).is_err());
        assert!(u16::from_value(&Value::Float(12.0)).is_err());
        assert!(i32::from_value(&Value::Float(1.5)).is_err());
        assert!(i32::from_value(&Value::from("7")).is_err());
        assert!(i64::from_value(&Value::Decimal(Decimal::from(7i64))).is_err());
        assert!(i64::from_value(&Value::Bool(true)).is_err());
    }

    #[test]
    fn large_unsigned_values_survive_as_decimal() {
        let stored = u64::MAX.to_value();
        assert!(matches!(stored, Value::Decimal(_)));
        assert_eq!(u64::from_value(&stored), Ok(u64::MAX));
        // JSON brings the decimal back as text.
        assert_eq!(u64::from_value(&Value::from(u64::MAX.to_string())), Ok(u64::MAX));
        assert_eq!(7u64.to_value(), Value::Int(7));
        // Anything inside the i64 range is only ever stored as an int.
        assert!(u64::from_value(&Value::from("7")).is_err());
        assert!(u64::from_value(&Value::Decimal(Decimal::from(7i64))).is_err());
        assert!(usize::from_value(&Value::Float(7.0)).is_err());
    }

    #[test]
    fn floats_widen_from_ints() {
        assert_eq!(f64::from_value(&Value::Int(3)), Ok(3.0));
        assert_eq!(f32::from_value(&Value::Float(0.5)), Ok(0.5));
        assert!(f32::from_value(&Value::Float(1e300)).is_err());
        assert!(f64::from_value(&Value::from("3.0")).is_err());
    }

    #[test]
    fn declared_text_fallbacks() {
        assert_eq!(Vec::<u8>::from_value(&Value::from("AQID")), Ok(vec![1, 2, 3]));
        let date = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            DateTime::<Utc>::from_value(&Value::from("2001-02-03T04:05:06Z")),
            Ok(date)
        );
        assert_eq!(
            Decimal::from_value(&Value::from("9.99")).map(|d| d.to_string()),
            Ok("9.99".to_owned())
        );
        assert_eq!(Decimal::from_value(&Value::Int(4)), Ok(Decimal::from(4)));
        assert!(Vec::<u8>::from_value(&Value::from("*not base64*")).is_err());
    }

    #[test]
    fn sequence_mismatch_points_at_element() {
        let value = Value::Sequence(vec![Value::Int(1), Value::from("two"), Value::Int(3)]);
        let err = Vec::<i32>::from_value(&value).unwrap_err();
        assert_eq!(err.at, KeyPath::from_iter([1usize]));
        assert_eq!((err.expected, err.found), (ValueKind::Int, ValueKind::Text));
    }

    #[test]
    fn maps_accept_store_or_mapping() {
        let mut store = Store::new();
        store.set("b", 2i64);
        store.set("a", 1i64);
        let ordered = IndexMap::<String, i32>::from_value(&Value::Store(store.clone())).unwrap();
        assert_eq!(ordered.keys().collect::<Vec<_>>(), ["b", "a"]);

        let sorted = BTreeMap::<String, i64>::from_value(&sorted_mapping()).unwrap();
        assert_eq!(sorted.keys().collect::<Vec<_>>(), ["a", "b"]);

        let err = HashMap::<String, bool>::from_value(&Value::Store(store)).unwrap_err();
        assert_eq!(err.at.len(), 1);
    }

    fn sorted_mapping() -> Value {
        let mut map = Mapping::new();
        map.insert("b".into(), Value::Int(2));
        map.insert("a".into(), Value::Int(1));
        Value::Mapping(map)
    }

    #[test]
    fn any_value_is_kept() {
        let v = Value::Sequence(vec![Value::Null, Value::Bool(true)]);
        assert_eq!(Value::from_value(&v), Ok(v.clone()));
        assert_eq!(<Value as FieldValue>::kind(), ValueKind::Any);
    }
}
