//! Store → model.
//!
//! A [`Decoder`] reads one store (one model). Each read produces a
//! [`Decoded`] that is then resolved according to the field's presence
//! mode: [`required`](Decoded::required), [`optional`](Decoded::optional)
//! or [`implicit`](Decoded::implicit). Model constructors combine the
//! resolved fields with `?` in declaration order, so the first required
//! failure stops the decode.

use std::borrow::Cow;
use std::cell::RefCell;

use indexmap::IndexMap;
use modelkit_pack::{Store, Value, ValueKind};
use tracing::trace;

use crate::diagnostics::DecodeReport;
use crate::error::DecodeError;
use crate::field::FieldValue;
use crate::migration;
use crate::model::Model;
use crate::path::{KeyPath, PathSegment};

/// The three possible results of reading one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Present(T),
    /// Key missing or stored as null.
    Absent(KeyPath),
    Failed(DecodeError),
}

/// A field read that has not yet been resolved by presence mode.
#[must_use = "resolve with .required(), .optional() or .implicit()"]
pub struct Decoded<'d, T> {
    outcome: Outcome<T>,
    report: &'d RefCell<DecodeReport>,
}

impl<'d, T> Decoded<'d, T> {
    fn new(outcome: Outcome<T>, report: &'d RefCell<DecodeReport>) -> Self {
        Self { outcome, report }
    }

    pub fn outcome(&self) -> &Outcome<T> {
        &self.outcome
    }

    pub fn into_outcome(self) -> Outcome<T> {
        self.outcome
    }

    pub fn is_present(&self) -> bool {
        matches!(self.outcome, Outcome::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.outcome, Outcome::Absent(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    /// Transforms a present value, e.g. to collect into another map type.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<'d, U> {
        let outcome = match self.outcome {
            Outcome::Present(value) => Outcome::Present(f(value)),
            Outcome::Absent(path) => Outcome::Absent(path),
            Outcome::Failed(err) => Outcome::Failed(err),
        };
        Decoded::new(outcome, self.report)
    }

    /// Absent is an error; failures propagate.
    pub fn required(self) -> Result<T, DecodeError> {
        match self.outcome {
            Outcome::Present(value) => Ok(value),
            Outcome::Absent(path) => Err(DecodeError::RequiredFieldAbsent { path }),
            Outcome::Failed(err) => Err(err),
        }
    }

    /// Absent and failed both become `None`. Failures are kept in the
    /// decode report, never returned.
    pub fn optional(self) -> Option<T> {
        match self.outcome {
            Outcome::Present(value) => Some(value),
            Outcome::Absent(_) => None,
            Outcome::Failed(err) => {
                trace!(path = %err.path(), error = %err, "optional field recovered");
                self.report.borrow_mut().recovered.push(err);
                None
            }
        }
    }

    /// Absent yields `default`; failures still propagate.
    pub fn implicit_or(self, default: T) -> Result<T, DecodeError> {
        match self.outcome {
            Outcome::Present(value) => Ok(value),
            Outcome::Absent(path) => {
                trace!(path = %path, "implicit field defaulted");
                self.report.borrow_mut().defaulted.push(path);
                Ok(default)
            }
            Outcome::Failed(err) => Err(err),
        }
    }

    /// Absent yields `T::default()`; failures still propagate.
    pub fn implicit(self) -> Result<T, DecodeError>
    where
        T: Default,
    {
        self.implicit_or(T::default())
    }
}

/// Reads typed fields and nested models out of one store.
pub struct Decoder<'a> {
    store: &'a Store,
    path: KeyPath,
    report: &'a RefCell<DecodeReport>,
}

impl<'a> Decoder<'a> {
    /// The (already migrated) store this decoder reads.
    pub fn store(&self) -> &Store {
        self.store
    }

    /// Path of this store from the root.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Looks `key` up, treating a stored null like a missing key.
    fn lookup(&self, key: &str) -> Result<(&'a Value, KeyPath), KeyPath> {
        let path = self.path.child(key);
        match self.store.get(key) {
            None | Some(Value::Null) => Err(path),
            Some(value) => Ok((value, path)),
        }
    }

    fn decoded<T>(&self, outcome: Outcome<T>) -> Decoded<'a, T> {
        Decoded::new(outcome, self.report)
    }

    /// A primitive, or a sequence/map of primitives.
    pub fn decode_field<T: FieldValue>(&self, key: &str) -> Decoded<'a, T> {
        let (value, path) = match self.lookup(key) {
            Ok(found) => found,
            Err(path) => return self.decoded(Outcome::Absent(path)),
        };
        let outcome = match T::from_value(value) {
            Ok(v) => Outcome::Present(v),
            Err(mismatch) => Outcome::Failed(DecodeError::TypeMismatch {
                path: path.join(&mismatch.at),
                expected: mismatch.expected,
                found: mismatch.found,
            }),
        };
        self.decoded(outcome)
    }

    /// A nested model, decoded through `M`'s own migration and constructor.
    pub fn decode_model<M: Model>(&self, key: &str) -> Decoded<'a, M> {
        let (value, path) = match self.lookup(key) {
            Ok(found) => found,
            Err(path) => return self.decoded(Outcome::Absent(path)),
        };
        let store = match nested_store(value, &path) {
            Ok(store) => store,
            Err(err) => return self.decoded(Outcome::Failed(err)),
        };
        let outcome = match decode_store::<M>(store, path.clone(), self.report) {
            Ok(model) => Outcome::Present(model),
            Err(source) => Outcome::Failed(DecodeError::NestedModel {
                path,
                source: Box::new(source),
            }),
        };
        self.decoded(outcome)
    }

    /// A sequence of nested models. Any failing element fails the whole
    /// field.
    pub fn decode_sequence_of_models<M: Model>(&self, key: &str) -> Decoded<'a, Vec<M>> {
        let (value, path) = match self.lookup(key) {
            Ok(found) => found,
            Err(path) => return self.decoded(Outcome::Absent(path)),
        };
        let Some(items) = value.as_sequence() else {
            return self.decoded(Outcome::Failed(mismatch(path, ValueKind::Sequence, value)));
        };
        let mut models = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match decode_value::<M>(item, path.index(index), self.report) {
                Ok(model) => models.push(model),
                Err(source) => {
                    return self.decoded(Outcome::Failed(DecodeError::SequenceElement {
                        path,
                        element: PathSegment::Index(index),
                        source: Box::new(source),
                    }))
                }
            }
        }
        self.decoded(Outcome::Present(models))
    }

    /// A string-keyed mapping of nested models, in stored key order. Any
    /// failing entry fails the whole field.
    pub fn decode_mapping_of_models<M: Model>(&self, key: &str) -> Decoded<'a, IndexMap<String, M>> {
        let (value, path) = match self.lookup(key) {
            Ok(found) => found,
            Err(path) => return self.decoded(Outcome::Absent(path)),
        };
        let Some(entries) = value.as_entries() else {
            return self.decoded(Outcome::Failed(mismatch(path, ValueKind::Mapping, value)));
        };
        let mut models = IndexMap::with_capacity(entries.len());
        for (name, item) in entries {
            match decode_value::<M>(item, path.child(name.as_str()), self.report) {
                Ok(model) => {
                    models.insert(name.clone(), model);
                }
                Err(source) => {
                    return self.decoded(Outcome::Failed(DecodeError::SequenceElement {
                        path,
                        element: PathSegment::Key(name.clone()),
                        source: Box::new(source),
                    }))
                }
            }
        }
        self.decoded(Outcome::Present(models))
    }

    /// Shorthand for `decode_field(key).required()`.
    pub fn required<T: FieldValue>(&self, key: &str) -> Result<T, DecodeError> {
        self.decode_field(key).required()
    }

    /// Shorthand for `decode_field(key).optional()`.
    pub fn optional<T: FieldValue>(&self, key: &str) -> Option<T> {
        self.decode_field(key).optional()
    }

    /// Shorthand for `decode_field(key).implicit()`.
    pub fn implicit<T: FieldValue + Default>(&self, key: &str) -> Result<T, DecodeError> {
        self.decode_field(key).implicit()
    }
}

fn mismatch(path: KeyPath, expected: ValueKind, found: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        path,
        expected,
        found: found.kind(),
    }
}

/// The store a nested model is read from.
fn nested_store<'v>(value: &'v Value, path: &KeyPath) -> Result<Cow<'v, Store>, DecodeError> {
    match value {
        Value::Store(store) => Ok(Cow::Borrowed(store)),
        Value::Mapping(map) => Ok(Cow::Owned(Store::from(map.clone()))),
        other => Err(mismatch(path.clone(), ValueKind::Store, other)),
    }
}

/// Decodes one collection element that should hold a nested model.
fn decode_value<M: Model>(
    value: &Value,
    path: KeyPath,
    report: &RefCell<DecodeReport>,
) -> Result<M, DecodeError> {
    let store = nested_store(value, &path)?;
    decode_store(store, path, report)
}

/// Migration, then field extraction, then the finishing hook.
pub(crate) fn decode_store<M: Model>(
    store: Cow<'_, Store>,
    path: KeyPath,
    report: &RefCell<DecodeReport>,
) -> Result<M, DecodeError> {
    let store = migration::migrate::<M>(store, &path, report)?;
    let decoder = Decoder {
        store: &*store,
        path,
        report,
    };
    let mut model = M::decode(&decoder)?;
    model.on_decode_finished(&decoder);
    Ok(model)
}

/// Decodes `M` from a root store, or returns the failure.
pub fn try_decode_model<M: Model>(store: &Store) -> Result<M, DecodeError> {
    let report = RefCell::new(DecodeReport::default());
    decode_store(Cow::Borrowed(store), KeyPath::root(), &report)
}

/// Decodes `M` from a root store; any failure yields `None`.
pub fn decode_model<M: Model>(store: &Store) -> Option<M> {
    try_decode_model(store).ok()
}

/// Decodes `M` and returns everything the decode recovered from along the
/// way.
pub fn decode_model_with_report<M: Model>(store: &Store) -> (Option<M>, DecodeReport) {
    let report = RefCell::new(DecodeReport::default());
    let result = decode_store::<M>(Cow::Borrowed(store), KeyPath::root(), &report);
    let mut report = report.into_inner();
    match result {
        Ok(model) => (Some(model), report),
        Err(err) => {
            report.failure = Some(err);
            (None, report)
        }
    }
}
