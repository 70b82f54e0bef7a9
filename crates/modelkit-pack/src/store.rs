//! [`Store`] — the neutral, format-agnostic key-value tree.

use indexmap::IndexMap;

use crate::value::{Mapping, Value};

/// Ordered, string-keyed container of [`Value`]s.
///
/// This is the pivot representation every codec reads from and writes to.
/// Keys are unique; insertion order is kept so text formats round-trip
/// with stable output, but it does not take part in lookup or equality.
/// A missing key is an ordinary `None`, never an error.
///
/// # Example
///
/// ```
/// use modelkit_pack::{Store, Value};
///
/// let mut store = Store::new();
/// store.set("id", 7i64);
/// store.set("name", "Ada");
/// assert_eq!(store.get("id"), Some(&Value::Int(7)));
/// assert_eq!(store.get("email"), None);
/// assert_eq!(store.keys().collect::<Vec<_>>(), ["id", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    entries: Mapping,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Inserts or replaces the value under `key`. A replaced key keeps its
    /// original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Inserts `value` only when `key` is absent. Returns `true` if inserted.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Moves the value under `from` to `to`, in place. Returns `false` when
    /// `from` is absent. An existing value under `to` is overwritten.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> bool {
        let Some(index) = self.entries.get_index_of(from) else {
            return false;
        };
        let to = to.into();
        if to == from {
            return true;
        }
        self.entries.shift_remove(to.as_str());
        // Removing `to` may have shifted `from` down by one.
        let index = self.entries.get_index_of(from).unwrap_or(index);
        if let Some((_, value)) = self.entries.shift_remove_index(index) {
            self.entries.shift_insert(index, to, value);
        }
        true
    }

    /// Replaces the value under `key` with `f(value)`. Returns `false` when
    /// `key` is absent.
    pub fn update(&mut self, key: &str, f: impl FnOnce(Value) -> Value) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                let value = std::mem::replace(slot, Value::Null);
                *slot = f(value);
                true
            }
            None => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &Mapping {
        &self.entries
    }

    pub fn into_inner(self) -> Mapping {
        self.entries
    }
}

impl From<Mapping> for Store {
    fn from(entries: Mapping) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Store {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Store {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
