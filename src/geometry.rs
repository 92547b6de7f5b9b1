//! Shape and rectangle primitives.

use serde::{Deserialize, Serialize};

/// Pixel coordinates are clamped to this magnitude before integer conversion.
const COORD_LIMIT: f32 = 1.0e8;

/// A detected outline, reduced to its minimal oriented rectangle.
///
/// Coordinates are image pixels; `angle` is in degrees, clockwise in image
/// space (y pointing down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub angle: f32,
}

impl Shape {
    pub fn new(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
            angle: 0.0,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Area in square pixels.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// The four corners of the oriented rectangle.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(dx, dy)| {
            (
                self.cx + dx * cos - dy * sin,
                self.cy + dx * sin + dy * cos,
            )
        })
    }

    /// Upright integer rectangle covering the corner points.
    ///
    /// Corners are snapped to whole pixels first, and the rectangle includes
    /// the last row and column it touches.
    pub fn bounding_rect(&self) -> PixelRect {
        let corners = self.corners();
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for (x, y) in corners {
            let (x, y) = (to_pixel(x), to_pixel(y));
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        PixelRect::from_corners(min_x, min_y, max_x.saturating_add(1), max_y.saturating_add(1))
    }
}

/// Snaps a coordinate to its pixel, within `COORD_LIMIT`. NaN maps to 0.
fn to_pixel(v: f32) -> i32 {
    v.floor().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// An upright rectangle in pixel coordinates. May extend past image bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Builds a rectangle from its top-left and (exclusive) bottom-right corner.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn union(&self, other: &PixelRect) -> PixelRect {
        PixelRect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grows the rectangle by `margin` pixels on every side.
    pub fn expand(&self, margin: i32) -> PixelRect {
        PixelRect::from_corners(
            self.x.saturating_sub(margin),
            self.y.saturating_sub(margin),
            self.right().saturating_add(margin),
            self.bottom().saturating_add(margin),
        )
    }

    /// Intersects with a `width`x`height` image. Returns None if nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(width as i32);
        let y1 = self.bottom().min(height as i32);
        let clamped = PixelRect::from_corners(x0, y0, x1, y1);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}

/// Union of the bounding rectangles of all shapes, or None for no shapes.
pub fn union_bounds(shapes: &[Shape]) -> Option<PixelRect> {
    shapes
        .iter()
        .map(Shape::bounding_rect)
        .reduce(|acc, rect| acc.union(&rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_bounding_rect() {
        let shape = Shape::new(100.0, 50.0, 10.0, 4.0);
        let rect = shape.bounding_rect();
        assert_eq!(rect.x, 95);
        assert_eq!(rect.y, 48);
        assert_eq!(rect.right(), 106);
        assert_eq!(rect.bottom(), 53);
    }

    #[test]
    fn test_rotated_bounding_rect_swaps_extents() {
        let shape = Shape::new(50.0, 50.0, 20.0, 6.0).with_angle(90.0);
        let rect = shape.bounding_rect();
        // A quarter turn makes the shape tall and narrow
        assert!(rect.height > rect.width);
        assert!((rect.height - 21).abs() <= 1);
        assert!((rect.width - 7).abs() <= 1);
    }

    #[test]
    fn test_area_ignores_angle() {
        let shape = Shape::new(0.0, 0.0, 8.0, 10.0).with_angle(33.0);
        assert_eq!(shape.area(), 80.0);
    }

    #[test]
    fn test_union_bounds() {
        let shapes = [
            Shape::new(10.0, 10.0, 4.0, 4.0),
            Shape::new(40.0, 30.0, 4.0, 4.0),
        ];
        let rect = union_bounds(&shapes).unwrap();
        assert_eq!((rect.x, rect.y), (8, 8));
        assert_eq!((rect.right(), rect.bottom()), (43, 33));
        assert!(union_bounds(&[]).is_none());
    }

    #[test]
    fn test_expand_and_clamp() {
        let rect = PixelRect::from_corners(2, 3, 20, 30).expand(10);
        assert_eq!(rect, PixelRect::from_corners(-8, -7, 30, 40));

        let clamped = rect.clamp_to(25, 35).unwrap();
        assert_eq!(clamped, PixelRect::from_corners(0, 0, 25, 35));
    }

    #[test]
    fn test_clamp_outside_image_is_none() {
        let rect = PixelRect::from_corners(120, 10, 140, 20);
        assert!(rect.clamp_to(100, 100).is_none());
    }

    #[test]
    fn test_huge_shape_bounding_rect_is_bounded() {
        let shape = Shape::new(50.0, 25.0, 5.0e9, 10.0);
        let rect = shape.bounding_rect();

        assert!(rect.width > 0);
        assert_eq!(rect.x, -COORD_LIMIT as i32);
        assert_eq!(rect.right(), COORD_LIMIT as i32 + 1);
        assert_eq!(
            rect.expand(10).clamp_to(200, 100),
            Some(PixelRect::from_corners(0, 10, 200, 41))
        );
    }

    #[test]
    fn test_non_finite_shape_does_not_panic() {
        let rect = Shape::new(f32::NAN, 10.0, f32::INFINITY, 4.0).bounding_rect();
        assert!(rect.width >= 0);
    }

    #[test]
    fn test_shape_deserializes_without_angle() {
        let shape: Shape =
            serde_json::from_str(r#"{"cx": 1.5, "cy": 2, "width": 3, "height": 4}"#).unwrap();
        assert_eq!(shape, Shape::new(1.5, 2.0, 3.0, 4.0));
    }
}
