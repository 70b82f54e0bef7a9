//! Model → store.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;
use modelkit_pack::{Mapping, Store, Value};

use crate::field::FieldValue;
use crate::migration::VERSION_KEY;
use crate::model::Model;

/// A field value that may be missing; `None` omits the key.
pub trait EncodeField {
    fn encoded(&self) -> Option<Value>;
}

impl<T: FieldValue> EncodeField for T {
    fn encoded(&self) -> Option<Value> {
        Some(self.to_value())
    }
}

impl<T: FieldValue> EncodeField for Option<T> {
    fn encoded(&self) -> Option<Value> {
        self.as_ref().map(T::to_value)
    }
}

/// A nested model, or an optional one.
pub trait EncodeModel {
    fn encoded(&self) -> Option<Value>;
}

impl<M: Model> EncodeModel for M {
    fn encoded(&self) -> Option<Value> {
        Some(Value::Store(encode_store(self)))
    }
}

impl<M: Model> EncodeModel for Option<M> {
    fn encoded(&self) -> Option<Value> {
        self.as_ref().map(|m| Value::Store(encode_store(m)))
    }
}

/// An ordered collection of models.
pub trait ModelSequence {
    fn encoded(&self) -> Option<Value>;
}

fn sequence<'m, M: Model + 'm>(models: impl Iterator<Item = &'m M>) -> Value {
    Value::Sequence(models.map(|m| Value::Store(encode_store(m))).collect())
}

impl<M: Model> ModelSequence for [M] {
    fn encoded(&self) -> Option<Value> {
        Some(sequence(self.iter()))
    }
}

impl<M: Model> ModelSequence for Vec<M> {
    fn encoded(&self) -> Option<Value> {
        Some(sequence(self.iter()))
    }
}

impl<M: Model> ModelSequence for Option<Vec<M>> {
    fn encoded(&self) -> Option<Value> {
        self.as_ref().map(|models| sequence(models.iter()))
    }
}

/// A string-keyed collection of models.
pub trait ModelMapping {
    fn encoded(&self) -> Option<Value>;
}

fn mapping<'m, M: Model + 'm>(entries: impl Iterator<Item = (&'m String, &'m M)>) -> Value {
    Value::Mapping(
        entries
            .map(|(key, m)| (key.clone(), Value::Store(encode_store(m))))
            .collect::<Mapping>(),
    )
}

impl<M: Model, S: BuildHasher> ModelMapping for IndexMap<String, M, S> {
    fn encoded(&self) -> Option<Value> {
        Some(mapping(self.iter()))
    }
}

impl<M: Model> ModelMapping for BTreeMap<String, M> {
    fn encoded(&self) -> Option<Value> {
        Some(mapping(self.iter()))
    }
}

/// Written in key order so the output does not depend on hashing.
impl<M: Model, S: BuildHasher> ModelMapping for HashMap<String, M, S> {
    fn encoded(&self) -> Option<Value> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Some(mapping(entries.into_iter()))
    }
}

impl<T: ModelMapping> ModelMapping for Option<T> {
    fn encoded(&self) -> Option<Value> {
        self.as_ref().and_then(ModelMapping::encoded)
    }
}

/// Builds the store for one model.
#[derive(Debug, Default)]
pub struct Encoder {
    store: Store,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries written so far.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Direct access for finishing hooks that write raw entries.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    fn put(&mut self, key: &str, value: Option<Value>) {
        if let Some(value) = value {
            self.store.set(key, value);
        }
    }

    /// A primitive or primitive collection; `None` omits the key.
    pub fn encode_field<F: EncodeField + ?Sized>(&mut self, key: &str, value: &F) {
        self.put(key, value.encoded());
    }

    /// A nested model; `None` omits the key.
    pub fn encode_model<E: EncodeModel + ?Sized>(&mut self, key: &str, model: &E) {
        self.put(key, model.encoded());
    }

    pub fn encode_sequence_of_models<S: ModelSequence + ?Sized>(&mut self, key: &str, models: &S) {
        self.put(key, models.encoded());
    }

    pub fn encode_mapping_of_models<S: ModelMapping + ?Sized>(&mut self, key: &str, models: &S) {
        self.put(key, models.encoded());
    }
}

/// Fields, then the version marker, then the finishing hook.
pub(crate) fn encode_store<M: Model>(model: &M) -> Store {
    let mut encoder = Encoder::new();
    model.encode(&mut encoder);
    if let Some(version) = M::current_version() {
        encoder.store.set(VERSION_KEY, version.as_str());
    }
    model.on_encode_finished(&mut encoder);
    encoder.store
}

/// Encodes a model into a fresh root store.
pub fn encode_model<M: Model>(model: &M) -> Store {
    encode_store(model)
}
