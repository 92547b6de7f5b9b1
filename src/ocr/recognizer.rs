use image::RgbaImage;

use super::engine::{RecognitionProfile, TextEngine};
use crate::config::PipelineConfig;
use crate::error::ZoneError;
use crate::template::ZoneDefinition;

/// Characters dropped from the end of raw OCR output.
///
/// Tesseract ends its stdout with a newline and a form feed.
pub const DEFAULT_TRAILING_NOISE_CHARS: usize = 2;

/// Reads a normalized region and restricts the result to the zone alphabet.
pub struct TextRecognizer<'a> {
    engine: &'a dyn TextEngine,
    text_profile: RecognitionProfile,
    mrz_profile: RecognitionProfile,
    trailing_noise_chars: usize,
}

impl<'a> TextRecognizer<'a> {
    pub fn new(engine: &'a dyn TextEngine, config: &PipelineConfig) -> Self {
        Self {
            engine,
            text_profile: RecognitionProfile::natural_language(config),
            mrz_profile: RecognitionProfile::machine_readable(config),
            trailing_noise_chars: config.trailing_noise_chars,
        }
    }

    /// Profile used for the given zone.
    pub fn profile_for(&self, zone: &ZoneDefinition) -> &RecognitionProfile {
        if zone.machine_readable {
            &self.mrz_profile
        } else {
            &self.text_profile
        }
    }

    /// Runs OCR on the region and sanitizes the output.
    ///
    /// An engine failure is reported as `RecognitionFailure`; the pipeline
    /// records it as an empty string.
    pub fn recognize(
        &self,
        region: &RgbaImage,
        zone_name: &str,
        zone: &ZoneDefinition,
    ) -> Result<String, ZoneError> {
        let profile = self.profile_for(zone);
        let raw = self
            .engine
            .recognize(region, profile)
            .map_err(|e| ZoneError::RecognitionFailure {
                zone: zone_name.to_string(),
                reason: format!("{:#}", e),
            })?;

        Ok(sanitize(&raw, zone, self.trailing_noise_chars))
    }
}

/// Drops the trailing noise characters, then everything outside the alphabet.
pub fn sanitize(raw: &str, zone: &ZoneDefinition, trailing_noise_chars: usize) -> String {
    zone.alphabet.filter(&strip_trailing(raw, trailing_noise_chars))
}

/// Removes the last `count` characters, whatever they are.
pub fn strip_trailing(raw: &str, count: usize) -> String {
    let keep = raw.chars().count().saturating_sub(count);
    raw.chars().take(keep).collect()
}
