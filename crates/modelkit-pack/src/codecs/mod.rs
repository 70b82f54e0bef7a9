//! Per-format codecs over [`Store`](crate::Store).

mod binary;
mod json;
mod plist;
mod registry;
mod types;

pub use binary::BinaryCodec;
pub use json::JsonCodec;
pub use plist::PlistCodec;
pub use registry::Codecs;
pub use types::{CodecError, FormatCodec};
