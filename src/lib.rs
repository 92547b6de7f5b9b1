//! Passport Zones
//!
//! Locates the fields of a document template on a scanned page, crops and
//! normalizes each field's text region, and reads it with Tesseract.

pub mod config;
pub mod debug;
pub mod error;
pub mod geometry;
pub mod ocr;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod shapes;
pub mod template;
pub mod zones;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

pub use config::PipelineConfig;
pub use error::ZoneError;
pub use geometry::{PixelRect, Shape};
pub use ocr::{RecognitionProfile, TesseractEngine, TextEngine};
pub use pipeline::{Pipeline, extract};
pub use template::{Alphabet, Direction, Template, ZoneDefinition};
pub use zones::{ZoneCapture, assign};

/// Logs a message to both console and log file with timestamp.
///
/// Console output goes to stderr so extracted fields can be piped from stdout.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("passport_zones.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
