//! Property-list codec wrapper.

use crate::{plist::PlistDecoder, plist::PlistEncoder, Format, Store};

use super::types::{CodecError, FormatCodec};

#[derive(Debug, Default, Clone)]
pub struct PlistCodec {
    pub encoder: PlistEncoder,
    pub decoder: PlistDecoder,
}

impl PlistCodec {
    pub fn new() -> Self {
        Self {
            encoder: PlistEncoder::new(),
            decoder: PlistDecoder::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        "plist"
    }

    pub fn format(&self) -> Format {
        Format::Plist
    }

    pub fn encode(&mut self, store: &Store, pretty: bool) -> Result<Vec<u8>, CodecError> {
        Ok(self.encoder.encode(store, pretty)?)
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Result<Store, CodecError> {
        Ok(self.decoder.decode(bytes)?)
    }
}

impl FormatCodec for PlistCodec {
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
