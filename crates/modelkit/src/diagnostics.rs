//! Per-call record of what a decode did besides succeeding or failing.

use crate::error::DecodeError;
use crate::migration::VersionMarker;
use crate::path::KeyPath;

/// A migration that ran while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    pub path: KeyPath,
    /// Rust type name of the migrated model.
    pub model: &'static str,
    pub from: VersionMarker,
    pub to: Option<VersionMarker>,
}

/// Diagnostics collected by [`decode_model_with_report`](crate::decode_model_with_report).
///
/// Optional-field failures and implicit defaults never surface as errors;
/// this is where they can be inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeReport {
    /// The failure that stopped the decode, if any.
    pub failure: Option<DecodeError>,
    /// Failures swallowed by optional fields.
    pub recovered: Vec<DecodeError>,
    /// Implicit fields that were absent and took their default.
    pub defaulted: Vec<KeyPath>,
    pub migrations: Vec<MigrationRecord>,
}

impl DecodeReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// True when the decode succeeded without recovering from anything.
    pub fn is_clean(&self) -> bool {
        self.failure.is_none() && self.recovered.is_empty()
    }
}
