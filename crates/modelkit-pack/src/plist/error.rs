//! Property-list encoder/decoder error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlistError {
    #[error("null has no property-list representation")]
    NullUnsupported,
    #[error("unknown element <{0}>")]
    UnknownTag(String),
    #[error("expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: &'static str, found: String },
    #[error("unexpected text `{0}` outside a value")]
    UnexpectedText(String),
    #[error("invalid <{tag}> content `{text}`")]
    InvalidLeaf { tag: &'static str, text: String },
    #[error("<dict> value without a preceding <key>")]
    MissingKey,
    #[error("<key> `{0}` has no value")]
    DanglingKey(String),
    #[error("<{0}> is not allowed here")]
    Misplaced(&'static str),
    #[error("unknown entity `&{0};`")]
    UnknownEntity(String),
    #[error("nesting exceeds {0} levels")]
    TooDeep(usize),
    #[error("document root must be a dict, found {0}")]
    RootNotDict(&'static str),
    #[error("document holds no value")]
    Empty,
    #[error("document ends inside <{0}>")]
    Truncated(&'static str),
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
