//! Error taxonomy for template loading and per-zone extraction.
//!
//! Only `MalformedTemplate` ever reaches the caller of the pipeline; the
//! per-zone variants are logged and replaced with an empty result.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    /// Template description is missing fields, has wrong types, or
    /// describes an impossible layout.
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    /// No detected shape was assigned to the zone.
    #[error("Zone '{0}' has no assigned shapes")]
    EmptyZone(String),

    /// The OCR capability failed or timed out.
    #[error("Recognition failed for zone '{zone}': {reason}")]
    RecognitionFailure { zone: String, reason: String },

    /// The capture rectangle has no overlap with the image, even after clamping.
    #[error("Capture region for zone '{zone}' lies outside the {width}x{height} image")]
    DegenerateGeometry {
        zone: String,
        width: u32,
        height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_zone() {
        let err = ZoneError::DegenerateGeometry {
            zone: "surname".into(),
            width: 100,
            height: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("surname"));
        assert!(msg.contains("100x50"));
    }
}
