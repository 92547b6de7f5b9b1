use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};
use crate::config::PipelineConfig;

/// How the OCR capability should read a region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionProfile {
    /// Tesseract language code, e.g. "rus" or "eng"
    pub language: String,
    /// Tesseract page segmentation mode
    pub page_segmentation_mode: u32,
}

impl RecognitionProfile {
    /// Fixed-font Latin profile for machine-readable zones.
    pub fn machine_readable(config: &PipelineConfig) -> Self {
        Self {
            language: config.mrz_language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Natural-language profile for free-form zones.
    pub fn natural_language(config: &PipelineConfig) -> Self {
        Self {
            language: config.text_language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }
}

/// An OCR capability: turns an image into raw text.
///
/// Output may carry trailing noise and characters outside any alphabet;
/// callers sanitize it.
pub trait TextEngine {
    fn recognize(&self, image: &RgbaImage, profile: &RecognitionProfile) -> Result<String>;
}

/// Runs the Tesseract command-line tool, one process per call.
#[derive(Clone, Debug)]
pub struct TesseractEngine {
    pub executable: PathBuf,
    pub tessdata_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl TesseractEngine {
    /// Locates Tesseract and the tessdata for both recognition profiles.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
        let tessdata_dir = find_tessdata_dir(
            config.tessdata_dir.as_deref(),
            &[config.text_language.as_str(), config.mrz_language.as_str()],
        );

        crate::log(&format!(
            "Tesseract: {} (tessdata: {})",
            executable.display(),
            tessdata_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        ));

        Ok(Self {
            executable,
            tessdata_dir,
            timeout: Duration::from_millis(config.ocr_timeout_ms),
        })
    }
}

impl TextEngine for TesseractEngine {
    fn recognize(&self, image: &RgbaImage, profile: &RecognitionProfile) -> Result<String> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        image
            .save(temp_input.path())
            .with_context(|| "failed to write temp image for OCR")?;

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&profile.language)
            .arg("--psm")
            .arg(profile.page_segmentation_mode.to_string());
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }

        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| "failed to run tesseract (is it installed?)")?;

        // Pipes are drained on their own threads while the child is polled
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = std::thread::spawn(move || read_pipe(stdout));
        let stderr_reader = std::thread::spawn(move || read_pipe(stderr));

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e).context("failed to poll tesseract");
                }
            }
            if start.elapsed() > self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(anyhow!(
                    "Tesseract timed out after {}ms",
                    self.timeout.as_millis()
                ));
            }
            std::thread::sleep(Duration::from_millis(10));
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(anyhow!(
                "Tesseract failed: {}",
                String::from_utf8_lossy(&stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer);
    }
    buffer
}
