//! `BinaryDecoder` — reads the tagged layout described in [`super`].

use chrono::DateTime;
use modelkit_buffers::Reader;

use crate::{Decimal, Mapping, Store, Value, MAX_DEPTH};

use super::constants::*;
use super::error::BinaryError;

#[derive(Debug, Default, Clone)]
pub struct BinaryDecoder;

impl BinaryDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a whole document. Trailing bytes are an error.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<Store, BinaryError> {
        let mut reader = Reader::new(bytes);
        let magic = reader.buf(MAGIC.len()).map_err(|_| BinaryError::BadMagic)?;
        if magic != MAGIC {
            return Err(BinaryError::BadMagic);
        }
        let version = reader.u8().map_err(|_| BinaryError::BadMagic)?;
        if version != VERSION {
            return Err(BinaryError::UnsupportedVersion(version));
        }
        let store = Store::from(read_entries(&mut reader, 0)?);
        if !reader.is_eof() {
            return Err(BinaryError::TrailingBytes(reader.size()));
        }
        Ok(store)
    }
}

fn read_len(reader: &mut Reader<'_>) -> Result<usize, BinaryError> {
    Ok(reader.u32()? as usize)
}

fn read_str(reader: &mut Reader<'_>) -> Result<String, BinaryError> {
    let len = read_len(reader)?;
    Ok(reader.utf8(len)?.to_owned())
}

fn read_entries(reader: &mut Reader<'_>, depth: usize) -> Result<Mapping, BinaryError> {
    let count = read_len(reader)?;
    // Each entry needs at least a key length and a tag.
    let mut entries = Mapping::with_capacity(count.min(reader.size() / 5));
    for _ in 0..count {
        let key = read_str(reader)?;
        let value = read_any(reader, depth + 1)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

fn read_any(reader: &mut Reader<'_>, depth: usize) -> Result<Value, BinaryError> {
    if depth > MAX_DEPTH {
        return Err(BinaryError::TooDeep(MAX_DEPTH));
    }
    let offset = reader.x;
    let tag = reader.u8()?;
    Ok(match tag {
        TAG_NULL => Value::Null,
        TAG_FALSE => Value::Bool(false),
        TAG_TRUE => Value::Bool(true),
        TAG_INT => Value::Int(reader.i64()?),
        TAG_FLOAT => Value::Float(reader.f64()?),
        TAG_TEXT => Value::Text(read_str(reader)?),
        TAG_BINARY => {
            let len = read_len(reader)?;
            Value::Binary(reader.buf(len)?.to_vec())
        }
        TAG_DATE => {
            let secs = reader.i64()?;
            let nanos = reader.u32()?;
            let date = DateTime::from_timestamp(secs, nanos)
                .ok_or(BinaryError::InvalidDate { secs, nanos })?;
            Value::Date(date)
        }
        TAG_DECIMAL => {
            let text = read_str(reader)?;
            let decimal = text
                .parse::<Decimal>()
                .map_err(|_| BinaryError::InvalidDecimal(text))?;
            Value::Decimal(decimal)
        }
        TAG_STORE => Value::Store(Store::from(read_entries(reader, depth)?)),
        TAG_MAPPING => Value::Mapping(read_entries(reader, depth)?),
        TAG_SEQUENCE => {
            let count = read_len(reader)?;
            let mut items = Vec::with_capacity(count.min(reader.size()));
            for _ in 0..count {
                items.push(read_any(reader, depth + 1)?);
            }
            Value::Sequence(items)
        }
        tag => return Err(BinaryError::UnknownTag { tag, offset }),
    })
}
