//! Document extraction: shape assignment, region synthesis and recognition
//! for every zone of a template.
//!
//! Zones are processed one after another. A failure inside one zone is
//! logged and recorded as an empty string; it never stops the others.

use image::RgbaImage;
use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::debug::{ExtractionObserver, NoopObserver};
use crate::error::ZoneError;
use crate::geometry::Shape;
use crate::ocr::{RegionSynthesizer, TextEngine, TextRecognizer};
use crate::template::{Template, ZoneDefinition};
use crate::zones::{ZoneCapture, assign_with_noise_floor};

/// A loaded template bound to an OCR engine and tuning parameters.
pub struct Pipeline {
    template: Template,
    config: PipelineConfig,
    engine: Box<dyn TextEngine>,
}

impl Pipeline {
    pub fn new(template: Template, config: PipelineConfig, engine: Box<dyn TextEngine>) -> Self {
        Self {
            template,
            config,
            engine,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extracts the text of every zone from one scanned image.
    pub fn extract(&self, image: &RgbaImage, shapes: &[Shape]) -> BTreeMap<String, String> {
        self.extract_observed(image, shapes, &mut NoopObserver)
    }

    /// Like `extract`, reporting intermediate artifacts to `observer`.
    pub fn extract_observed(
        &self,
        image: &RgbaImage,
        shapes: &[Shape],
        observer: &mut dyn ExtractionObserver,
    ) -> BTreeMap<String, String> {
        extract_with(
            image,
            shapes,
            &self.template,
            &self.config,
            self.engine.as_ref(),
            observer,
        )
    }
}

/// Extracts every zone with the default configuration.
pub fn extract(
    image: &RgbaImage,
    shapes: &[Shape],
    template: &Template,
    engine: &dyn TextEngine,
) -> BTreeMap<String, String> {
    extract_with(
        image,
        shapes,
        template,
        &PipelineConfig::default(),
        engine,
        &mut NoopObserver,
    )
}

/// Extracts every zone of `template` from `image`.
///
/// The result has one entry per template zone; zones that could not be read
/// map to an empty string.
pub fn extract_with(
    image: &RgbaImage,
    shapes: &[Shape],
    template: &Template,
    config: &PipelineConfig,
    engine: &dyn TextEngine,
    observer: &mut dyn ExtractionObserver,
) -> BTreeMap<String, String> {
    let (width, height) = image.dimensions();
    let (scale_x, scale_y) = template.scale_for(width, height);
    crate::log(&format!(
        "Extracting '{}' from {}x{} image ({} shapes, scale {:.3}x{:.3})",
        template.name(),
        width,
        height,
        shapes.len(),
        scale_x,
        scale_y
    ));

    let mut captures =
        assign_with_noise_floor(shapes, template, scale_x, scale_y, config.noise_floor_area);
    let synthesizer = RegionSynthesizer::from_config(config);
    let recognizer = TextRecognizer::new(engine, config);

    let mut results = BTreeMap::new();
    for (name, zone) in template.zones() {
        let capture = captures.entry(name.clone()).or_default();
        capture.sort_top_to_bottom();
        observer.on_assignment(
            image,
            name,
            &zone.to_pixel_rect(scale_x, scale_y),
            &capture.shapes,
        );

        let text = match read_zone(image, name, zone, capture, &synthesizer, &recognizer, observer)
        {
            Ok(text) => text,
            Err(e) => {
                crate::log(&format!("{}; recording empty text", e));
                String::new()
            }
        };
        crate::log(&format!("Zone '{}': {:?}", name, text));
        observer.on_text(name, &text);

        capture.recognized_text.push(text);
        results.insert(name.clone(), capture.last_text().to_string());
    }

    results
}

fn read_zone(
    image: &RgbaImage,
    name: &str,
    zone: &ZoneDefinition,
    capture: &mut ZoneCapture,
    synthesizer: &RegionSynthesizer,
    recognizer: &TextRecognizer<'_>,
    observer: &mut dyn ExtractionObserver,
) -> Result<String, ZoneError> {
    if capture.shapes.is_empty() {
        return Err(ZoneError::EmptyZone(name.to_string()));
    }

    let region = synthesizer.synthesize(image, name, capture, zone)?;
    let region = capture.region.insert(region);
    observer.on_region(name, region);

    recognizer.recognize(region, name, zone)
}
