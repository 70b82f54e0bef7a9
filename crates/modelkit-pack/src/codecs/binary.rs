//! Binary codec wrapper.

use crate::{binary::BinaryDecoder, binary::BinaryEncoder, Format, Store};

use super::types::{CodecError, FormatCodec};

#[derive(Default)]
pub struct BinaryCodec {
    pub encoder: BinaryEncoder,
    pub decoder: BinaryDecoder,
}

impl BinaryCodec {
    pub fn new() -> Self {
        Self {
            encoder: BinaryEncoder::new(),
            decoder: BinaryDecoder::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        "binary"
    }

    pub fn format(&self) -> Format {
        Format::Binary
    }

    /// `pretty` has no meaning for the binary layout and is ignored.
    pub fn encode(&mut self, store: &Store, _pretty: bool) -> Result<Vec<u8>, CodecError> {
        Ok(self.encoder.encode(store)?)
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Result<Store, CodecError> {
        Ok(self.decoder.decode(bytes)?)
    }
}

impl FormatCodec for BinaryCodec {
    fn id(&self) -> &'static str {
        self.id()
    }

    fn format(&self) -> Format {
        self.format()
    }

    fn encode(&mut self, store: &Store, pretty: bool) -> Result<Vec<u8>, CodecError> {
        self.encode(store, pretty)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<Store, CodecError> {
        self.decode(bytes)
    }
}
