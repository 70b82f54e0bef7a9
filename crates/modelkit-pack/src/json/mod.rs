//! JSON rendering of a [`Store`](crate::Store).
//!
//! Variants JSON cannot express natively are written in their declared text
//! fallback (see [`crate::text`]) and come back as `Value::Text`.

pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;
pub use error::JsonError;
