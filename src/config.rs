//! Pipeline tuning parameters.
//!
//! Loads settings from config.json at startup. Every field has a default, so a
//! missing or partial file still yields a usable configuration. The defaults
//! were calibrated against 300 dpi passport scans and the stock Tesseract
//! models; other scan resolutions may need different values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::preprocess::{DEFAULT_CROP_MARGIN, DEFAULT_INTENSITY_CEILING};
use crate::ocr::recognizer::DEFAULT_TRAILING_NOISE_CHARS;
use crate::zones::DEFAULT_NOISE_FLOOR_AREA;

/// Complete pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Shapes whose area in template units is at or below this are speckle
    #[serde(default = "default_noise_floor_area")]
    pub noise_floor_area: f32,
    /// Pixels added on every side of a zone's shape union before cropping
    #[serde(default = "default_crop_margin")]
    pub crop_margin: u32,
    /// Channel values above this are raised to 255 (truncation threshold)
    #[serde(default = "default_intensity_ceiling")]
    pub intensity_ceiling: u8,
    /// Characters dropped from the end of raw OCR output
    #[serde(default = "default_trailing_noise_chars")]
    pub trailing_noise_chars: usize,
    /// Tesseract language for free-form zones
    #[serde(default = "default_text_language")]
    pub text_language: String,
    /// Tesseract language for the machine-readable zone
    #[serde(default = "default_mrz_language")]
    pub mrz_language: String,
    /// Tesseract page segmentation mode
    #[serde(default = "default_page_segmentation_mode")]
    pub page_segmentation_mode: u32,
    /// Maximum time a single OCR call may take (milliseconds)
    #[serde(default = "default_ocr_timeout_ms")]
    pub ocr_timeout_ms: u64,
    /// Explicit tesseract executable
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
}

fn default_noise_floor_area() -> f32 {
    DEFAULT_NOISE_FLOOR_AREA
}

fn default_crop_margin() -> u32 {
    DEFAULT_CROP_MARGIN
}

fn default_intensity_ceiling() -> u8 {
    DEFAULT_INTENSITY_CEILING
}

fn default_trailing_noise_chars() -> usize {
    DEFAULT_TRAILING_NOISE_CHARS
}

fn default_text_language() -> String {
    "rus".to_string()
}

fn default_mrz_language() -> String {
    "eng".to_string()
}

fn default_page_segmentation_mode() -> u32 {
    6 // Assume single uniform block of text
}

fn default_ocr_timeout_ms() -> u64 {
    30000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            noise_floor_area: default_noise_floor_area(),
            crop_margin: default_crop_margin(),
            intensity_ceiling: default_intensity_ceiling(),
            trailing_noise_chars: default_trailing_noise_chars(),
            text_language: default_text_language(),
            mrz_language: default_mrz_language(),
            page_segmentation_mode: default_page_segmentation_mode(),
            ocr_timeout_ms: default_ocr_timeout_ms(),
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

/// Loads configuration from the given file or returns defaults.
///
/// Unreadable or unparsable files are logged and ignored.
pub fn load_config(config_path: &Path) -> PipelineConfig {
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
            }
        }
    } else {
        crate::log("Config not found. Using default config.");
    }

    PipelineConfig::default()
}
