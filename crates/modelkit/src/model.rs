//! The [`Model`] protocol.

use modelkit_pack::Store;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{DecodeError, MigrationError};
use crate::migration::VersionMarker;

/// A user type with a fixed set of named fields that maps to and from a
/// [`Store`].
///
/// `decode` and `encode` must use the same keys. Fields are read in
/// declaration order and combined with `?`; the presence mode of each field
/// is chosen by how its [`Decoded`](crate::Decoded) is resolved.
///
/// ```
/// use modelkit::{DecodeError, Decoder, Encoder, Model};
///
/// struct User {
///     id: i64,
///     name: String,
///     email: Option<String>,
/// }
///
/// impl Model for User {
///     fn decode(d: &Decoder<'_>) -> Result<Self, DecodeError> {
///         Ok(User {
///             id: d.required("id")?,
///             name: d.required("name")?,
///             email: d.optional("email"),
///         })
///     }
///
///     fn encode(&self, e: &mut Encoder) {
///         e.encode_field("id", &self.id);
///         e.encode_field("name", &self.name);
///         e.encode_field("email", &self.email);
///     }
/// }
///
/// let store = modelkit::encode_model(&User { id: 7, name: "Ada".into(), email: None });
/// assert_eq!(store.keys().collect::<Vec<_>>(), ["id", "name"]);
/// let back: User = modelkit::decode_model(&store).unwrap();
/// assert_eq!((back.id, back.name.as_str(), back.email), (7, "Ada", None));
/// ```
pub trait Model: Sized {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError>;

    fn encode(&self, encoder: &mut Encoder);

    /// Marker stamped under [`VERSION_KEY`](crate::VERSION_KEY) on encode.
    /// `None` writes no marker.
    fn current_version() -> Option<VersionMarker> {
        None
    }

    /// Rewrites a store written with version `from` into the current
    /// layout. Runs once, before any field is read, and only when the
    /// stored marker is non-empty and differs from
    /// [`current_version`](Model::current_version).
    fn migrate(store: Store, from: &VersionMarker) -> Result<Store, MigrationError> {
        let _ = from;
        Ok(store)
    }

    /// Runs after every field decoded successfully.
    fn on_decode_finished(&mut self, _decoder: &Decoder<'_>) {}

    /// Runs after every field and the version marker were written.
    fn on_encode_finished(&self, _encoder: &mut Encoder) {}
}
