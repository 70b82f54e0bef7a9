//! Version markers and the decode-time migration step.

use std::any::type_name;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;

use modelkit_pack::{Store, Value};
use tracing::debug;

use crate::diagnostics::{DecodeReport, MigrationRecord};
use crate::error::{DecodeError, MigrationError};
use crate::model::Model;
use crate::path::KeyPath;

/// Reserved store key holding a model's [`VersionMarker`].
pub const VERSION_KEY: &str = "_version";

/// Opaque schema version of a model, compared by equality only.
///
/// An empty marker opts the stored data out of migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionMarker(String);

impl VersionMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for VersionMarker {
    fn from(marker: &str) -> Self {
        Self::new(marker)
    }
}

impl From<String> for VersionMarker {
    fn from(marker: String) -> Self {
        Self(marker)
    }
}

impl PartialEq<&str> for VersionMarker {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a store says about the version it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredVersion {
    /// No marker; written before versioning or by an unversioned model.
    Unversioned,
    /// An empty marker; never migrated.
    OptedOut,
    Marked(VersionMarker),
}

impl StoredVersion {
    pub fn read(store: &Store) -> Result<Self, MigrationError> {
        match store.get(VERSION_KEY) {
            None | Some(Value::Null) => Ok(StoredVersion::Unversioned),
            Some(Value::Text(text)) if text.is_empty() => Ok(StoredVersion::OptedOut),
            Some(Value::Text(text)) => Ok(StoredVersion::Marked(VersionMarker::new(text.as_str()))),
            Some(other) => Err(MigrationError::InvalidMarker(other.kind())),
        }
    }

    /// The stored marker when it differs from `current` and so calls for a
    /// migration.
    pub fn needs_migration(&self, current: Option<&VersionMarker>) -> Option<&VersionMarker> {
        match self {
            StoredVersion::Marked(stored) if Some(stored) != current => Some(stored),
            _ => None,
        }
    }
}

/// Runs `M`'s migration over `store` at most once and returns the store the
/// fields should be read from. The input is never modified in place.
pub(crate) fn migrate<'s, M: Model>(
    store: Cow<'s, Store>,
    path: &KeyPath,
    report: &RefCell<DecodeReport>,
) -> Result<Cow<'s, Store>, DecodeError> {
    let fail = |source| DecodeError::Migration {
        path: path.clone(),
        source,
    };
    let stored = StoredVersion::read(&store).map_err(fail)?;
    let current = M::current_version();
    let Some(from) = stored.needs_migration(current.as_ref()) else {
        return Ok(store);
    };
    debug!(
        model = type_name::<M>(),
        path = %path,
        from = %from,
        to = ?current.as_ref().map(VersionMarker::as_str),
        "migrating stored model"
    );
    let migrated = M::migrate(store.into_owned(), from).map_err(fail)?;
    report.borrow_mut().migrations.push(MigrationRecord {
        path: path.clone(),
        model: type_name::<M>(),
        from: from.clone(),
        to: current,
    });
    Ok(Cow::Owned(migrated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_marker(value: impl Into<Value>) -> Store {
        let mut store = Store::new();
        store.set(VERSION_KEY, value);
        store
    }

    #[test]
    fn classifies_markers() {
        assert_eq!(StoredVersion::read(&Store::new()), Ok(StoredVersion::Unversioned));
        assert_eq!(StoredVersion::read(&with_marker("")), Ok(StoredVersion::OptedOut));
        assert_eq!(
            StoredVersion::read(&with_marker("2")),
            Ok(StoredVersion::Marked("2".into()))
        );
        assert!(StoredVersion::read(&with_marker(2i64)).is_err());
    }

    #[test]
    fn migration_needed_only_on_mismatch() {
        let current = VersionMarker::from("2");
        let marked = StoredVersion::Marked("1".into());
        assert_eq!(marked.needs_migration(Some(&current)), Some(&VersionMarker::from("1")));
        assert_eq!(marked.needs_migration(None), Some(&VersionMarker::from("1")));
        assert_eq!(StoredVersion::Marked("2".into()).needs_migration(Some(&current)), None);
        assert_eq!(StoredVersion::OptedOut.needs_migration(Some(&current)), None);
        assert_eq!(StoredVersion::Unversioned.needs_migration(Some(&current)), None);
    }
}
