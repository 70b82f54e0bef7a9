//! JSON encoder/decoder error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("non-finite float {0} has no JSON representation")]
    NonFiniteFloat(f64),
    #[error("integer {0} is outside the signed 64-bit range")]
    IntegerOutOfRange(String),
    #[error("document root must be an object, found {0}")]
    RootNotObject(&'static str),
    #[error("nesting exceeds {0} levels")]
    TooDeep(usize),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
