//! Typed models to and from a neutral key-value [`Store`], and that store to
//! and from JSON, XML property lists or a binary layout.
//!
//! - [`Model`] - the protocol a user type implements
//! - [`Decoder`] / [`Decoded`] - field reads resolved as required, optional or implicit
//! - [`Encoder`] - field writes; absent optionals are omitted
//! - [`migration`] - version markers and the decode-time migration step
//! - [`io`] - byte, text and file compositions over the codecs
//!
//! Decoding a model runs its migration (when the stored version marker
//! differs from the current one), reads every field, then calls the
//! finishing hook. Encoding writes every field, stamps the version marker,
//! then calls the finishing hook.

mod decoder;
mod diagnostics;
mod encoder;
mod error;
mod field;
mod model;
mod path;

pub mod io;
pub mod migration;

pub use decoder::{decode_model, decode_model_with_report, try_decode_model, Decoded, Decoder, Outcome};
pub use diagnostics::{DecodeReport, MigrationRecord};
pub use encoder::{encode_model, EncodeField, EncodeModel, Encoder, ModelMapping, ModelSequence};
pub use error::{DecodeError, FailureKind, MigrationError, ModelIoError};
pub use field::{FieldMismatch, FieldValue};
pub use io::{
    inspect, model_from_bytes, model_from_str, model_to_bytes, model_to_string, read_bytes,
    read_model, read_model_auto, write_bytes, write_model, write_model_auto, write_model_with,
    WriteOptions,
};
pub use migration::{StoredVersion, VersionMarker, VERSION_KEY};
pub use model::Model;
pub use path::{KeyPath, PathSegment};

pub use modelkit_pack::{Decimal, Format, Mapping, Store, Value, ValueKind};

/// Codecs and the raw store types, for callers working below the model
/// layer.
pub use modelkit_pack as pack;
