//! Common codec trait and error.

use crate::{binary::BinaryError, json::JsonError, plist::PlistError, Format, Store};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] JsonError),
    #[error("plist codec error: {0}")]
    Plist(#[from] PlistError),
    #[error("binary codec error: {0}")]
    Binary(#[from] BinaryError),
}

/// A bidirectional transform between a [`Store`] and one wire format.
///
/// Codecs perform no I/O. `pretty` asks text formats for indented output;
/// the binary codec ignores it.
pub trait FormatCodec: Send {
    fn id(&self) -> &'static str;
    fn format(&self) -> Format;
    fn encode(&mut self, store: &Store, pretty: bool) -> Result<Vec<u8>, CodecError>;
    fn decode(&mut self, bytes: &[u8]) -> Result<Store, CodecError>;
}
