//! JSON codec wrapper.

use crate::{json::JsonDecoder, json::JsonEncoder, Format, Store};

use super::types::{CodecError, FormatCodec};

#[derive(Debug, Default, Clone)]
pub struct JsonCodec {
    pub encoder: JsonEncoder,
    pub decoder: JsonDecoder,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self {
            encoder: JsonEncoder::new(),
            decoder: JsonDecoder::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        "json"
    }

    pub fn format(&self) -> Format {
        Format::Json
    }

    pub fn encode(&mut self, store: &Store, pretty: bool) -> Result<Vec<u8>, CodecError> {
        Ok(self.encoder.encode(store, pretty)?)
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Result<Store, CodecError> {
        Ok(self.decoder.decode(bytes)?)
    }
}

impl FormatCodec for JsonCodec {
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
