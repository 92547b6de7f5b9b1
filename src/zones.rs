//! Assignment of detected shapes to template zones.

use image::RgbaImage;
use std::collections::BTreeMap;

use crate::geometry::Shape;
use crate::template::Template;

/// Shapes at or below this area (in template units) are treated as speckle.
pub const DEFAULT_NOISE_FLOOR_AREA: f32 = 50.0;

/// Working state for one zone of one source image.
///
/// Created fresh for every extraction and dropped once its text is read.
#[derive(Debug, Default)]
pub struct ZoneCapture {
    /// Shapes assigned to the zone
    pub shapes: Vec<Shape>,
    /// Synthesized capture image, once computed
    pub region: Option<RgbaImage>,
    /// One entry per recognition pass
    pub recognized_text: Vec<String>,
}

impl ZoneCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders shapes by the top edge of their bounding box.
    ///
    /// Stable, so shapes sharing a top edge keep their detection order.
    pub fn sort_top_to_bottom(&mut self) {
        self.shapes.sort_by_key(|shape| shape.bounding_rect().y);
    }

    /// Text from the most recent recognition pass, empty if none ran.
    pub fn last_text(&self) -> &str {
        self.recognized_text
            .last()
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Assigns shapes to zones using the default noise floor.
pub fn assign(
    shapes: &[Shape],
    template: &Template,
    scale_x: f32,
    scale_y: f32,
) -> BTreeMap<String, ZoneCapture> {
    assign_with_noise_floor(shapes, template, scale_x, scale_y, DEFAULT_NOISE_FLOOR_AREA)
}

/// Assigns every sufficiently large shape to each zone containing its center.
///
/// Coordinates are converted from pixels to template units with the given
/// scale factors. The result holds a capture for every zone of the template,
/// including zones that received no shapes. Overlapping zones each receive
/// the shape; templates are expected not to overlap.
pub fn assign_with_noise_floor(
    shapes: &[Shape],
    template: &Template,
    scale_x: f32,
    scale_y: f32,
    noise_floor_area: f32,
) -> BTreeMap<String, ZoneCapture> {
    let mut captures: BTreeMap<String, ZoneCapture> = template
        .zones()
        .keys()
        .map(|name| (name.clone(), ZoneCapture::new()))
        .collect();

    let unit_area = scale_x * scale_y;
    for shape in shapes {
        if shape.area() / unit_area <= noise_floor_area {
            continue;
        }
        let x = shape.cx / scale_x;
        let y = shape.cy / scale_y;
        for (name, zone) in template.zones() {
            if zone.contains(x, y) {
                if let Some(capture) = captures.get_mut(name) {
                    capture.shapes.push(*shape);
                }
            }
        }
    }

    for (name, capture) in &captures {
        crate::log(&format!(
            "Zone '{}': {} shape(s) assigned",
            name,
            capture.shapes.len()
        ));
    }

    captures
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_zone_template() -> Template {
        Template::load(
            r#"{"name":"t","width":200,"height":100,"blocks":{
                "left":{"posX":0,"posY":0,"width":100,"height":50,
                        "direction":"normal","whitelist":"ABC"},
                "right":{"posX":100,"posY":0,"width":100,"height":50,
                         "direction":"normal","whitelist":"ABC"}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_every_zone_gets_a_capture() {
        let captures = assign(&[], &two_zone_template(), 1.0, 1.0);
        assert_eq!(captures.len(), 2);
        assert!(captures.values().all(|c| c.shapes.is_empty()));
    }

    #[test]
    fn test_noise_floor() {
        let template = two_zone_template();
        let small = Shape::new(50.0, 25.0, 5.0, 5.0);
        let large = Shape::new(50.0, 25.0, 10.0, 10.0);

        let captures = assign(&[small, large], &template, 1.0, 1.0);
        assert_eq!(captures["left"].shapes, vec![large]);
    }

    #[test]
    fn test_noise_floor_is_exclusive() {
        let template = two_zone_template();
        let exactly_floor = Shape::new(50.0, 25.0, 5.0, 10.0);
        let captures = assign(&[exactly_floor], &template, 1.0, 1.0);
        assert!(captures["left"].shapes.is_empty());
    }

    #[test]
    fn test_noise_floor_uses_template_units() {
        let template = two_zone_template();
        // 12x12 px = 144 px², but only 36 template units at scale 2
        let shape = Shape::new(100.0, 50.0, 12.0, 12.0);
        let captures = assign(&[shape], &template, 2.0, 2.0);
        assert!(captures["left"].shapes.is_empty());
    }

    #[test]
    fn test_boundary_center_excluded() {
        let template = two_zone_template();
        // Center on the shared edge x = 100
        let shape = Shape::new(100.0, 25.0, 10.0, 10.0);
        let captures = assign(&[shape], &template, 1.0, 1.0);
        assert!(captures["left"].shapes.is_empty());
        assert!(captures["right"].shapes.is_empty());
    }

    #[test]
    fn test_assignment_invariant_under_scaling() {
        let template = two_zone_template();
        let shapes = [
            Shape::new(30.0, 20.0, 10.0, 10.0),
            Shape::new(150.0, 40.0, 12.0, 8.0),
            Shape::new(150.0, 80.0, 12.0, 8.0),
        ];
        let base = assign(&shapes, &template, 1.0, 1.0);

        let scaled: Vec<Shape> = shapes
            .iter()
            .map(|s| Shape::new(s.cx * 3.0, s.cy * 2.0, s.width * 3.0, s.height * 2.0))
            .collect();
        let rescaled = assign(&scaled, &template, 3.0, 2.0);

        for name in ["left", "right"] {
            assert_eq!(base[name].shapes.len(), rescaled[name].shapes.len());
        }
        assert_eq!(base["left"].shapes.len(), 1);
        assert_eq!(base["right"].shapes.len(), 1);
    }

    #[test]
    fn test_overlapping_zones_both_receive_shape() {
        let template = Template::load(
            r#"{"name":"t","width":100,"height":100,"blocks":{
                "a":{"posX":0,"posY":0,"width":60,"height":60,"direction":"normal","whitelist":"A"},
                "b":{"posX":40,"posY":40,"width":60,"height":60,"direction":"normal","whitelist":"B"}}}"#,
        )
        .unwrap();
        let shape = Shape::new(50.0, 50.0, 10.0, 10.0);
        let captures = assign(&[shape], &template, 1.0, 1.0);
        assert_eq!(captures["a"].shapes.len(), 1);
        assert_eq!(captures["b"].shapes.len(), 1);
    }

    #[test]
    fn test_sort_top_to_bottom() {
        let mut capture = ZoneCapture::new();
        capture.shapes = vec![
            Shape::new(20.0, 35.0, 10.0, 10.0), // top 30
            Shape::new(20.0, 15.0, 10.0, 10.0), // top 10
            Shape::new(20.0, 25.0, 10.0, 10.0), // top 20
        ];
        capture.sort_top_to_bottom();
        let tops: Vec<i32> = capture
            .shapes
            .iter()
            .map(|s| s.bounding_rect().y)
            .collect();
        assert_eq!(tops, vec![10, 20, 30]);
    }

    #[test]
    fn test_last_text() {
        let mut capture = ZoneCapture::new();
        assert_eq!(capture.last_text(), "");
        capture.recognized_text.push("first".into());
        capture.recognized_text.push("second".into());
        assert_eq!(capture.last_text(), "second");
    }
}
