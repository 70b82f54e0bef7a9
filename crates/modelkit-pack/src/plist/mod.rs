//! XML property-list rendering of a [`Store`](crate::Store).
//!
//! Tags: `<dict>`, `<array>`, `<string>`, `<integer>`, `<real>`, `<date>`,
//! `<data>`, `<true/>`, `<false/>`. `Decimal` is written as `<string>`;
//! `Null` has no property-list form and fails encoding.

pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::PlistDecoder;
pub use encoder::PlistEncoder;
pub use error::PlistError;
