//! Error types for decoding, migration and model I/O.

use std::path::PathBuf;

use modelkit_pack::{CodecError, Format, ValueKind};
use thiserror::Error;

use crate::migration::VersionMarker;
use crate::path::KeyPath;

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    AbsentWhenRequired,
    TypeMismatch,
    NestedModel,
    SequenceElement,
    Migration,
}

/// Why a model could not be decoded.
///
/// Every variant carries the key path from the root store to the field
/// where decoding stopped. Nested and element failures wrap the failure of
/// the inner model; [`DecodeError::leaf`] reaches the innermost one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("required field `{path}` is absent")]
    RequiredFieldAbsent { path: KeyPath },

    #[error("field `{path}` expected {expected}, found {found}")]
    TypeMismatch {
        path: KeyPath,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("nested model `{path}` failed: {source}")]
    NestedModel {
        path: KeyPath,
        source: Box<DecodeError>,
    },

    #[error("element `{element}` of `{path}` failed: {source}")]
    SequenceElement {
        path: KeyPath,
        element: crate::path::PathSegment,
        source: Box<DecodeError>,
    },

    #[error("migrating `{path}` failed: {source}")]
    Migration {
        path: KeyPath,
        source: MigrationError,
    },
}

impl DecodeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DecodeError::RequiredFieldAbsent { .. } => FailureKind::AbsentWhenRequired,
            DecodeError::TypeMismatch { .. } => FailureKind::TypeMismatch,
            DecodeError::NestedModel { .. } => FailureKind::NestedModel,
            DecodeError::SequenceElement { .. } => FailureKind::SequenceElement,
            DecodeError::Migration { .. } => FailureKind::Migration,
        }
    }

    /// Path of the field this error is reported at.
    pub fn path(&self) -> &KeyPath {
        match self {
            DecodeError::RequiredFieldAbsent { path }
            | DecodeError::TypeMismatch { path, .. }
            | DecodeError::NestedModel { path, .. }
            | DecodeError::SequenceElement { path, .. }
            | DecodeError::Migration { path, .. } => path,
        }
    }

    /// The innermost failure, below any nested-model or element wrappers.
    pub fn leaf(&self) -> &DecodeError {
        let mut current = self;
        while let DecodeError::NestedModel { source, .. }
        | DecodeError::SequenceElement { source, .. } = current
        {
            current = &**source;
        }
        current
    }

    /// A required field was absent or mistyped, or the model's migration
    /// failed. Wrapped failures are classified by their leaf.
    pub fn is_required_field_failure(&self) -> bool {
        matches!(
            self.leaf().kind(),
            FailureKind::AbsentWhenRequired | FailureKind::TypeMismatch | FailureKind::Migration
        )
    }
}

/// Returned by [`Model::migrate`](crate::Model::migrate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("no migration from stored version `{0}`")]
    UnsupportedVersion(VersionMarker),
    #[error("version marker must be text, found {0}")]
    InvalidMarker(ValueKind),
    #[error("{0}")]
    Rewrite(String),
}

/// Failure of a file, string or byte level model operation.
#[derive(Debug, Error)]
pub enum ModelIoError {
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {} into place at {}: {source}", temp_path.display(), target_path.display())]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{format} codec failed: {source}")]
    Codec {
        format: Format,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("document is not valid UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{format} text is not valid base64")]
    InvalidBase64 { format: Format },

    #[error("cannot tell the format of {} from its extension", path.display())]
    UnknownFormat { path: PathBuf },
}

pub type Result<T, E = ModelIoError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn absent(key: &str) -> DecodeError {
        DecodeError::RequiredFieldAbsent {
            path: KeyPath::from_iter([key]),
        }
    }

    #[test]
    fn leaf_unwraps_nesting() {
        let inner = absent("name");
        let err = DecodeError::SequenceElement {
            path: KeyPath::from_iter(["team"]),
            element: 1usize.into(),
            source: Box::new(DecodeError::NestedModel {
                path: KeyPath::from_iter(["team"]),
                source: Box::new(inner.clone()),
            }),
        };
        assert_eq!(err.kind(), FailureKind::SequenceElement);
        assert_eq!(err.leaf(), &inner);
        assert!(err.is_required_field_failure());
    }

    #[test]
    fn messages_name_the_path() {
        let err = DecodeError::TypeMismatch {
            path: KeyPath::root().child("scores").index(2),
            expected: ValueKind::Int,
            found: ValueKind::Text,
        };
        assert_eq!(err.to_string(), "field `scores[2]` expected int, found text");
        assert_eq!(absent("id").to_string(), "required field `id` is absent");
    }
}
