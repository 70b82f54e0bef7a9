//! Neutral key-value store and wire-format codecs for modelkit.
//!
//! - [`Store`] / [`Value`] - the format-agnostic tree every codec reads and writes
//! - [`json`] - structured text via `serde_json`
//! - [`plist`] - XML property lists via `quick-xml`
//! - [`binary`] - a deterministic tagged byte layout
//! - [`codecs`] - the [`FormatCodec`] trait tying them together
//!
//! # Example
//!
//! ```
//! use modelkit_pack::{Format, Store};
//!
//! let mut store = Store::new();
//! store.set("id", 7i64);
//! store.set("name", "Ada");
//!
//! for format in Format::ALL {
//!     let mut codec = format.codec();
//!     let bytes = codec.encode(&store, false).unwrap();
//!     assert_eq!(codec.decode(&bytes).unwrap(), store);
//! }
//! ```

mod constants;
mod decimal;
mod store;
mod value;

pub mod binary;
pub mod codecs;
pub mod json;
pub mod plist;
pub mod text;

pub use codecs::{BinaryCodec, CodecError, Codecs, FormatCodec, JsonCodec, PlistCodec};
pub use constants::{Format, UnknownFormat, MAX_DEPTH};
pub use decimal::{Decimal, DecimalError};
pub use store::Store;
pub use value::{Mapping, Value, ValueKind};
