//! Debug rendering of intermediate extraction artifacts.
//!
//! The pipeline reports zone assignments, cropped regions and recognized text
//! to an `ExtractionObserver`. `DebugDumpObserver` writes them to disk as PNG
//! overlays; the default observer ignores them.

use chrono::Local;
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::geometry::{PixelRect, Shape};
use crate::template::Template;

/// Color constants for overlay rendering.
pub const COLOR_ZONE: Rgba<u8> = Rgba([0, 0, 255, 255]); // Blue
pub const COLOR_SHAPE: Rgba<u8> = Rgba([255, 0, 0, 255]); // Red
pub const COLOR_CANVAS: Rgba<u8> = Rgba([0, 255, 0, 255]); // Green

/// Receives intermediate artifacts while a document is extracted.
pub trait ExtractionObserver {
    /// Called once per zone after shape assignment, before synthesis.
    fn on_assignment(
        &mut self,
        _image: &RgbaImage,
        _zone_name: &str,
        _zone_rect: &PixelRect,
        _shapes: &[Shape],
    ) {
    }

    /// Called with the normalized region handed to OCR.
    fn on_region(&mut self, _zone_name: &str, _region: &RgbaImage) {}

    /// Called with the final text of every zone.
    fn on_text(&mut self, _zone_name: &str, _text: &str) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {}

/// Saves an overlay and the capture region of every zone into a directory.
pub struct DebugDumpObserver {
    dir: PathBuf,
    prefix: String,
    saved: Vec<PathBuf>,
}

impl DebugDumpObserver {
    pub fn new(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            saved: Vec::new(),
        })
    }

    /// Files written so far.
    pub fn saved_files(&self) -> &[PathBuf] {
        &self.saved
    }

    fn save(&mut self, img: &RgbaImage, zone_name: &str, kind: &str) {
        let filename = format!("{}_{}_{}.png", self.prefix, file_safe(zone_name), kind);
        let path = self.dir.join(filename);
        match img.save(&path) {
            Ok(()) => {
                crate::log(&format!("Saved to {}", path.display()));
                self.saved.push(path);
            }
            Err(e) => crate::log(&format!("Failed to save {}: {}", path.display(), e)),
        }
    }
}

impl ExtractionObserver for DebugDumpObserver {
    fn on_assignment(
        &mut self,
        image: &RgbaImage,
        zone_name: &str,
        zone_rect: &PixelRect,
        shapes: &[Shape],
    ) {
        let overlay = render_overlay(image, zone_rect, shapes);
        self.save(&overlay, zone_name, "overlay");
    }

    fn on_region(&mut self, zone_name: &str, region: &RgbaImage) {
        self.save(region, zone_name, "roi");
    }

    fn on_text(&mut self, zone_name: &str, text: &str) {
        crate::log(&format!("[debug] {} = {:?}", zone_name, text));
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Draws a zone rectangle and the bounding boxes of its shapes on a copy of the image.
pub fn render_overlay(image: &RgbaImage, zone_rect: &PixelRect, shapes: &[Shape]) -> RgbaImage {
    let mut img = image.clone();
    for shape in shapes {
        draw_rect(&mut img, &shape.bounding_rect(), COLOR_SHAPE, 2);
    }
    draw_rect(&mut img, zone_rect, COLOR_ZONE, 2);
    img
}

/// Renders the template layout, optionally over a scan resized to the canvas.
///
/// The canvas is padded by 5 px on every side; the canvas border is drawn in
/// green and every zone in blue.
pub fn render_template_preview(template: &Template, scan: Option<&RgbaImage>) -> RgbaImage {
    let canvas_w = template.canvas_width().round() as u32;
    let canvas_h = template.canvas_height().round() as u32;
    let (width, height) = (canvas_w + 10, canvas_h + 10);

    let mut img = match scan {
        Some(scan) => image::imageops::resize(
            scan,
            width,
            height,
            image::imageops::FilterType::Triangle,
        ),
        None => ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255])),
    };

    draw_rect(
        &mut img,
        &PixelRect {
            x: 5,
            y: 5,
            width: canvas_w as i32,
            height: canvas_h as i32,
        },
        COLOR_CANVAS,
        2,
    );
    for zone in template.zones().values() {
        let rect = zone.to_pixel_rect(1.0, 1.0);
        draw_rect(
            &mut img,
            &PixelRect {
                x: rect.x + 5,
                y: rect.y + 5,
                ..rect
            },
            COLOR_ZONE,
            2,
        );
    }

    img
}

/// Draws a rectangle border on an image. Parts outside the image are skipped.
pub fn draw_rect(img: &mut RgbaImage, rect: &PixelRect, color: Rgba<u8>, thickness: i32) {
    let (img_w, img_h) = img.dimensions();
    let mut put = |px: i32, py: i32| {
        if px >= 0 && py >= 0 && (px as u32) < img_w && (py as u32) < img_h {
            img.put_pixel(px as u32, py as u32, color);
        }
    };

    for t in 0..thickness {
        // Top and bottom edges
        for dx in 0..rect.width {
            put(rect.x + dx, rect.y + t);
            put(rect.x + dx, rect.bottom() - 1 - t);
        }
        // Left and right edges
        for dy in 0..rect.height {
            put(rect.x + t, rect.y + dy);
            put(rect.right() - 1 - t, rect.y + dy);
        }
    }
}
