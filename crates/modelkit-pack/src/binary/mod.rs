//! Deterministic tagged byte layout for a [`Store`](crate::Store).
//!
//! ```text
//! document := MAGIC VERSION store
//! value    := tag payload
//! store    := u32 count (text value)*      ; keys are length-prefixed UTF-8
//! ```
//!
//! All multi-byte numbers are big-endian. Every [`Value`](crate::Value)
//! variant round-trips exactly, including `Null`, `Decimal` and the
//! distinction between a nested store and a mapping.

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::BinaryDecoder;
pub use encoder::BinaryEncoder;
pub use error::BinaryError;
