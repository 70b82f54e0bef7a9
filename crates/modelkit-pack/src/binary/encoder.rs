//! `BinaryEncoder` — writes the tagged layout described in [`super`].

use modelkit_buffers::Writer;

use crate::{Mapping, Store, Value, MAX_DEPTH};

use super::constants::*;
use super::error::BinaryError;

pub struct BinaryEncoder {
    pub writer: Writer,
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    /// Encodes a whole document: header followed by the root store.
    pub fn encode(&mut self, store: &Store) -> Result<Vec<u8>, BinaryError> {
        self.writer.reset();
        self.writer.buf(MAGIC);
        self.writer.u8(VERSION);
        let result = self.write_entries(store.as_map(), 0);
        let bytes = self.writer.flush();
        result.map(|()| bytes)
    }

    fn write_len(&mut self, len: usize) -> Result<(), BinaryError> {
        let len = u32::try_from(len).map_err(|_| BinaryError::TooLarge(len))?;
        self.writer.u32(len);
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), BinaryError> {
        self.write_len(s.len())?;
        self.writer.utf8(s);
        Ok(())
    }

    fn write_header(&mut self, tag: u8, len: usize) -> Result<(), BinaryError> {
        let len = u32::try_from(len).map_err(|_| BinaryError::TooLarge(len))?;
        self.writer.u8u32(tag, len);
        Ok(())
    }

    fn write_entries(&mut self, entries: &Mapping, depth: usize) -> Result<(), BinaryError> {
        self.write_len(entries.len())?;
        for (key, value) in entries {
            self.write_str(key)?;
            self.write_any(value, depth + 1)?;
        }
        Ok(())
    }

    pub fn write_any(&mut self, value: &Value, depth: usize) -> Result<(), BinaryError> {
        if depth > MAX_DEPTH {
            return Err(BinaryError::TooDeep(MAX_DEPTH));
        }
        match value {
            Value::Null => self.writer.u8(TAG_NULL),
            Value::Bool(false) => self.writer.u8(TAG_FALSE),
            Value::Bool(true) => self.writer.u8(TAG_TRUE),
            Value::Int(i) => {
                self.writer.u8(TAG_INT);
                self.writer.i64(*i);
            }
            Value::Float(f) => {
                self.writer.u8(TAG_FLOAT);
                self.writer.f64(*f);
            }
            Value::Text(s) => {
                self.write_header(TAG_TEXT, s.len())?;
                self.writer.utf8(s);
            }
            Value::Binary(bytes) => {
                self.write_header(TAG_BINARY, bytes.len())?;
                self.writer.buf(bytes);
            }
            Value::Date(date) => {
                self.writer.u8(TAG_DATE);
                self.writer.i64(date.timestamp());
                self.writer.u32(date.timestamp_subsec_nanos());
            }
            Value::Decimal(decimal) => {
                self.write_header(TAG_DECIMAL, decimal.as_str().len())?;
                self.writer.utf8(decimal.as_str());
            }
            Value::Store(store) => {
                self.writer.u8(TAG_STORE);
                self.write_entries(store.as_map(), depth)?;
            }
            Value::Mapping(map) => {
                self.writer.u8(TAG_MAPPING);
                self.write_entries(map, depth)?;
            }
            Value::Sequence(items) => {
                self.write_header(TAG_SEQUENCE, items.len())?;
                for item in items {
                    self.write_any(item, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}
