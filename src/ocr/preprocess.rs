use image::{ImageBuffer, Rgba, RgbaImage};

use crate::geometry::PixelRect;
use crate::template::Direction;

/// Pixels added on every side of a zone's shape union before cropping.
pub const DEFAULT_CROP_MARGIN: u32 = 10;

/// Channel values above this are raised to white.
pub const DEFAULT_INTENSITY_CEILING: u8 = 210;

/// Flattens paper background and glare while keeping ink strokes.
///
/// Each color channel above `ceiling` becomes 255; everything else passes
/// through untouched, so this is not a binarization. Alpha is preserved.
pub fn truncate_bright_pixels(
    img: &ImageBuffer<Rgba<u8>, Vec<u8>>,
    ceiling: u8,
) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let mut output = img.clone();

    for pixel in output.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            if *channel > ceiling {
                *channel = 255;
            }
        }
    }

    output
}

/// Crops a pixel rectangle from an image.
///
/// The rectangle is clamped to the image bounds; returns None when nothing
/// of it lies inside the image.
pub fn crop_rect(img: &RgbaImage, rect: &PixelRect) -> Option<RgbaImage> {
    let (w, h) = img.dimensions();
    let clamped = rect.clamp_to(w, h)?;

    Some(
        image::imageops::crop_imm(
            img,
            clamped.x as u32,
            clamped.y as u32,
            clamped.width as u32,
            clamped.height as u32,
        )
        .to_image(),
    )
}

/// Rotates a region so its text reads left-to-right.
pub fn correct_rotation(img: RgbaImage, direction: Direction) -> RgbaImage {
    match direction {
        Direction::Normal => img,
        Direction::Rotated90Cw => image::imageops::rotate90(&img),
        Direction::Rotated90Ccw => image::imageops::rotate270(&img),
        Direction::Rotated180 => image::imageops::rotate180(&img),
    }
}
