//! Document templates.
//!
//! A template names the rectangular fields of a document layout in a
//! normalized canvas space. It is loaded once from JSON and never mutated.
//!
//! ```json
//! {
//!   "name": "passport",
//!   "width": 200, "height": 100,
//!   "blocks": {
//!     "surname": { "posX": 0, "posY": 0, "width": 100, "height": 50,
//!                  "direction": "normal", "whitelist": "ABC" }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::ZoneError;
use crate::geometry::PixelRect;

/// Orientation the text of a zone is found in on the scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "normal")]
    Normal,
    /// Text turned left on the page, reading bottom-to-top.
    /// The crop is rotated 90° clockwise.
    #[serde(rename = "rotated-90-cw", alias = "left")]
    Rotated90Cw,
    /// Text turned right on the page, reading top-to-bottom.
    /// The crop is rotated 90° counter-clockwise.
    #[serde(rename = "rotated-90-ccw", alias = "right")]
    Rotated90Ccw,
    #[serde(rename = "rotated-180", alias = "inverted", alias = "upside-down")]
    Rotated180,
}

/// Characters permitted in a zone's recognized text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: BTreeSet<char>,
}

impl Alphabet {
    pub fn new(whitelist: &str) -> Self {
        Self {
            chars: whitelist.chars().collect(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Keeps only the characters of `text` that belong to the alphabet,
    /// preserving their order.
    pub fn filter(&self, text: &str) -> String {
        text.chars().filter(|c| self.contains(*c)).collect()
    }
}

/// One named field of a template.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneDefinition {
    pub pos_x: f32,
    pub pos_y: f32,
    pub width: f32,
    pub height: f32,
    pub direction: Direction,
    pub alphabet: Alphabet,
    /// Machine-readable zone: read with the fixed-font Latin profile
    pub machine_readable: bool,
}

impl ZoneDefinition {
    /// Strict containment test in template units. Points on an edge are outside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.pos_x
            && x < self.pos_x + self.width
            && y > self.pos_y
            && y < self.pos_y + self.height
    }

    /// Zone rectangle in image pixels for the given scale factors.
    pub fn to_pixel_rect(&self, scale_x: f32, scale_y: f32) -> PixelRect {
        let x = (self.pos_x * scale_x) as i32;
        let y = (self.pos_y * scale_y) as i32;
        let right = ((self.pos_x + self.width) * scale_x) as i32;
        let bottom = ((self.pos_y + self.height) * scale_y) as i32;
        PixelRect::from_corners(x, y, right, bottom)
    }
}

/// An immutable document layout.
#[derive(Clone, Debug)]
pub struct Template {
    name: String,
    canvas_width: f32,
    canvas_height: f32,
    zones: BTreeMap<String, ZoneDefinition>,
}

#[derive(Deserialize)]
struct TemplateDescription {
    name: String,
    width: f32,
    height: f32,
    blocks: BTreeMap<String, BlockDescription>,
}

#[derive(Deserialize)]
struct BlockDescription {
    #[serde(rename = "posX")]
    pos_x: f32,
    #[serde(rename = "posY")]
    pos_y: f32,
    width: f32,
    height: f32,
    direction: Direction,
    whitelist: String,
    #[serde(default)]
    mrz: bool,
}

impl Template {
    /// Parses and validates a JSON template description.
    pub fn load(description: &str) -> Result<Self, ZoneError> {
        let raw: TemplateDescription = serde_json::from_str(description)
            .map_err(|e| ZoneError::MalformedTemplate(e.to_string()))?;

        if !(raw.width.is_finite() && raw.width > 0.0 && raw.height.is_finite() && raw.height > 0.0)
        {
            return Err(ZoneError::MalformedTemplate(format!(
                "canvas size must be positive, got {}x{}",
                raw.width, raw.height
            )));
        }

        let mut zones = BTreeMap::new();
        for (name, block) in raw.blocks {
            let zone = validate_block(&name, block, raw.width, raw.height)?;
            zones.insert(name, zone);
        }

        Ok(Self {
            name: raw.name,
            canvas_width: raw.width,
            canvas_height: raw.height,
            zones,
        })
    }

    /// Reads and validates a template file.
    pub fn from_file(path: &Path) -> Result<Self, ZoneError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ZoneError::MalformedTemplate(format!("cannot read {}: {}", path.display(), e))
        })?;
        let template = Self::load(&contents)?;
        crate::log(&format!(
            "Template '{}' loaded: {}x{} canvas, {} zones",
            template.name,
            template.canvas_width,
            template.canvas_height,
            template.zones.len()
        ));
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f32 {
        self.canvas_height
    }

    pub fn zones(&self) -> &BTreeMap<String, ZoneDefinition> {
        &self.zones
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneDefinition> {
        self.zones.get(name)
    }

    /// Pixels per template unit along each axis for an image of the given size.
    pub fn scale_for(&self, image_width: u32, image_height: u32) -> (f32, f32) {
        (
            image_width as f32 / self.canvas_width,
            image_height as f32 / self.canvas_height,
        )
    }
}

fn validate_block(
    name: &str,
    block: BlockDescription,
    canvas_width: f32,
    canvas_height: f32,
) -> Result<ZoneDefinition, ZoneError> {
    if !(block.width > 0.0 && block.height > 0.0) {
        return Err(ZoneError::MalformedTemplate(format!(
            "zone '{}' has degenerate size {}x{}",
            name, block.width, block.height
        )));
    }
    if block.pos_x < 0.0
        || block.pos_y < 0.0
        || block.pos_x + block.width > canvas_width
        || block.pos_y + block.height > canvas_height
    {
        return Err(ZoneError::MalformedTemplate(format!(
            "zone '{}' extends outside the {}x{} canvas",
            name, canvas_width, canvas_height
        )));
    }
    let alphabet = Alphabet::new(&block.whitelist);
    if alphabet.is_empty() {
        return Err(ZoneError::MalformedTemplate(format!(
            "zone '{}' has an empty whitelist",
            name
        )));
    }

    Ok(ZoneDefinition {
        pos_x: block.pos_x,
        pos_y: block.pos_y,
        width: block.width,
        height: block.height,
        direction: block.direction,
        alphabet,
        machine_readable: block.mrz,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "sample",
        "width": 200,
        "height": 100,
        "blocks": {
            "surname": {"posX": 0, "posY": 0, "width": 100, "height": 50,
                        "direction": "normal", "whitelist": "ABC"},
            "number": {"posX": 180, "posY": 0, "width": 20, "height": 100,
                       "direction": "right", "whitelist": "0123456789"},
            "MRZ": {"posX": 0, "posY": 80, "width": 150, "height": 20,
                    "direction": "normal", "whitelist": "ABC<0123456789", "mrz": true}
        }
    }"#;

    fn malformed(description: &str) -> String {
        match Template::load(description) {
            Err(ZoneError::MalformedTemplate(msg)) => msg,
            other => panic!("expected MalformedTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_load_sample() {
        let template = Template::load(SAMPLE).unwrap();
        assert_eq!(template.name(), "sample");
        assert_eq!(template.canvas_width(), 200.0);
        assert_eq!(template.zones().len(), 3);

        let number = template.zone("number").unwrap();
        assert_eq!(number.direction, Direction::Rotated90Ccw);
        assert!(!number.machine_readable);
        assert!(template.zone("MRZ").unwrap().machine_readable);
    }

    #[test]
    fn test_direction_spellings() {
        let parse = |s: &str| serde_json::from_str::<Direction>(&format!("\"{}\"", s)).unwrap();
        assert_eq!(parse("normal"), Direction::Normal);
        assert_eq!(parse("rotated-90-cw"), Direction::Rotated90Cw);
        assert_eq!(parse("left"), Direction::Rotated90Cw);
        assert_eq!(parse("rotated-90-ccw"), Direction::Rotated90Ccw);
        assert_eq!(parse("right"), Direction::Rotated90Ccw);
        assert_eq!(parse("rotated-180"), Direction::Rotated180);
        assert_eq!(parse("upside-down"), Direction::Rotated180);
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let msg = malformed(
            r#"{"name":"t","width":10,"height":10,"blocks":{"a":{"posX":0,"posY":0,
                "width":5,"height":5,"direction":"sideways","whitelist":"A"}}}"#,
        );
        assert!(msg.contains("sideways"));
    }

    #[test]
    fn test_missing_field_rejected() {
        malformed(r#"{"name":"t","width":10,"blocks":{}}"#);
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        malformed(
            r#"{"name":"t","width":"wide","height":10,"blocks":{}}"#,
        );
    }

    #[test]
    fn test_degenerate_zone_rejected() {
        let msg = malformed(
            r#"{"name":"t","width":10,"height":10,"blocks":{"a":{"posX":0,"posY":0,
                "width":0,"height":5,"direction":"normal","whitelist":"A"}}}"#,
        );
        assert!(msg.contains("'a'"));
    }

    #[test]
    fn test_empty_whitelist_rejected() {
        let msg = malformed(
            r#"{"name":"t","width":10,"height":10,"blocks":{"a":{"posX":0,"posY":0,
                "width":5,"height":5,"direction":"normal","whitelist":""}}}"#,
        );
        assert!(msg.contains("whitelist"));
    }

    #[test]
    fn test_zone_outside_canvas_rejected() {
        malformed(
            r#"{"name":"t","width":10,"height":10,"blocks":{"a":{"posX":8,"posY":0,
                "width":5,"height":5,"direction":"normal","whitelist":"A"}}}"#,
        );
    }

    #[test]
    fn test_non_positive_canvas_rejected() {
        malformed(r#"{"name":"t","width":0,"height":10,"blocks":{}}"#);
    }

    #[test]
    fn test_containment_is_strict() {
        let template = Template::load(SAMPLE).unwrap();
        let zone = template.zone("surname").unwrap();
        assert!(zone.contains(50.0, 25.0));
        assert!(!zone.contains(0.0, 25.0));
        assert!(!zone.contains(100.0, 25.0));
        assert!(!zone.contains(50.0, 50.0));
        assert!(!zone.contains(50.0, 0.0));
    }

    #[test]
    fn test_alphabet_filter_is_idempotent() {
        let alphabet = Alphabet::new("АБВ0123");
        let once = alphabet.filter("xА1 Б?В9\n");
        assert_eq!(once, "А1БВ");
        assert_eq!(alphabet.filter(&once), once);
    }

    #[test]
    fn test_scale_for() {
        let template = Template::load(SAMPLE).unwrap();
        assert_eq!(template.scale_for(400, 200), (2.0, 2.0));
        assert_eq!(template.scale_for(100, 300), (0.5, 3.0));
    }

    #[test]
    fn test_bundled_template_is_valid() {
        let template = Template::load(include_str!("../templates/passport_rf.json")).unwrap();
        assert_eq!(template.name(), "passport_rf");
        assert!(template.zone("MRZ").unwrap().machine_readable);
        assert_eq!(
            template.zone("series_number").unwrap().direction,
            Direction::Rotated90Ccw
        );
    }

    #[test]
    fn test_zone_pixel_rect() {
        let template = Template::load(SAMPLE).unwrap();
        let rect = template.zone("surname").unwrap().to_pixel_rect(2.0, 2.0);
        assert_eq!(rect, PixelRect { x: 0, y: 0, width: 200, height: 100 });
    }
}
