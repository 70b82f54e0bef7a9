//! Text fallbacks for variants a text format cannot express natively.
//!
//! These are the declared representations used by the JSON codec (and, for
//! dates and binary payloads, by the plist codec). Decoders on the model
//! side use the `*_from_text` parsers to recover the declared field type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when non-zero.
pub fn date_to_text(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses any RFC 3339 timestamp and normalizes it to UTC.
pub fn date_from_text(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Standard, padded base64.
pub fn binary_to_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard base64, ignoring ASCII whitespace (plist `<data>`
/// bodies are commonly wrapped across lines).
pub fn binary_from_text(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact).ok()
}
