use modelkit_buffers::BufferError;
use thiserror::Error;

/// Error type for binary encoding/decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinaryError {
    #[error("missing or corrupt header")]
    BadMagic,
    #[error("unsupported layout version {0}")]
    UnsupportedVersion(u8),
    #[error("unknown tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },
    #[error("invalid date {secs}s + {nanos}ns")]
    InvalidDate { secs: i64, nanos: u32 },
    #[error("invalid decimal `{0}`")]
    InvalidDecimal(String),
    #[error("{0} trailing bytes after document")]
    TrailingBytes(usize),
    #[error("length {0} does not fit in 32 bits")]
    TooLarge(usize),
    #[error("nesting exceeds {0} levels")]
    TooDeep(usize),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
