//! Synthesis of a zone's capture region.
//!
//! The union of the zone's shape boxes, plus a margin, is cropped from the
//! source image, brightened above the intensity ceiling and rotated upright.

use image::RgbaImage;

use super::preprocess::{
    DEFAULT_CROP_MARGIN, DEFAULT_INTENSITY_CEILING, correct_rotation, crop_rect,
    truncate_bright_pixels,
};
use crate::config::PipelineConfig;
use crate::error::ZoneError;
use crate::geometry::union_bounds;
use crate::template::ZoneDefinition;
use crate::zones::ZoneCapture;

#[derive(Clone, Copy, Debug)]
pub struct RegionSynthesizer {
    pub margin: u32,
    pub intensity_ceiling: u8,
}

impl Default for RegionSynthesizer {
    fn default() -> Self {
        Self {
            margin: DEFAULT_CROP_MARGIN,
            intensity_ceiling: DEFAULT_INTENSITY_CEILING,
        }
    }
}

impl RegionSynthesizer {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            margin: config.crop_margin,
            intensity_ceiling: config.intensity_ceiling,
        }
    }

    /// Builds the recognition-ready region for one zone.
    ///
    /// Fails with `EmptyZone` when the capture holds no shapes and with
    /// `DegenerateGeometry` when the expanded box misses the image entirely.
    /// A box that only partly leaves the image is clamped to its bounds.
    pub fn synthesize(
        &self,
        image: &RgbaImage,
        zone_name: &str,
        capture: &ZoneCapture,
        zone: &ZoneDefinition,
    ) -> Result<RgbaImage, ZoneError> {
        let bounds = union_bounds(&capture.shapes)
            .ok_or_else(|| ZoneError::EmptyZone(zone_name.to_string()))?;
        let expanded = bounds.expand(self.margin as i32);

        let (width, height) = image.dimensions();
        let cropped =
            crop_rect(image, &expanded).ok_or_else(|| ZoneError::DegenerateGeometry {
                zone: zone_name.to_string(),
                width,
                height,
            })?;

        crate::log(&format!(
            "Zone '{}': cropping x={} y={} w={} h={} ({:?})",
            zone_name,
            expanded.x.max(0),
            expanded.y.max(0),
            cropped.width(),
            cropped.height(),
            zone.direction
        ));

        let flattened = truncate_bright_pixels(&cropped, self.intensity_ceiling);
        Ok(correct_rotation(flattened, zone.direction))
    }
}
