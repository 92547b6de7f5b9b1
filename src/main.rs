//! Passport Zones command-line tool
//!
//! Reads the fields of a scanned document page given its template and the
//! shapes produced by an external contour detector.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use passport_zones::config::load_config;
use passport_zones::debug::{DebugDumpObserver, NoopObserver, render_template_preview};
use passport_zones::ocr::available_languages;
use passport_zones::shapes::load_shapes;
use passport_zones::{Pipeline, Template, TesseractEngine, log, output, paths};

#[derive(Parser, Debug)]
#[command(
    name = "passport-zones",
    version,
    about = "Extract template fields from scanned documents"
)]
struct Cli {
    /// Config file (default: config.json next to the executable)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recognize every zone of a scanned page
    Extract {
        /// Template file, or the name of a bundled template
        #[arg(short = 't', long = "template")]
        template: String,

        /// Scanned page image
        #[arg(short = 'i', long = "image")]
        image: PathBuf,

        /// JSON list of detected shapes
        #[arg(short = 's', long = "shapes")]
        shapes: PathBuf,

        /// Save zone overlays and capture regions into the debug folder
        #[arg(short = 'd', long = "debug")]
        debug: bool,

        /// Debug folder (default: debug/ next to the executable)
        #[arg(long = "debug-dir")]
        debug_dir: Option<PathBuf>,

        /// Write the JSON result here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Append the result as a row to this CSV file
        #[arg(long = "csv")]
        csv: Option<PathBuf>,
    },
    /// Render a template's zones, optionally over a scan
    Preview {
        /// Template file, or the name of a bundled template
        #[arg(short = 't', long = "template")]
        template: String,

        /// Scan to draw the zones on
        #[arg(short = 'i', long = "image")]
        image: Option<PathBuf>,

        /// Output PNG
        #[arg(long = "out")]
        out: PathBuf,
    },
    /// Check that Tesseract and the configured languages are available
    Check,
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log(&format!("[PANIC]{} {}", location, panic_info));
    }));

    paths::ensure_directories()?;

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(paths::get_config_path);
    let config = load_config(&config_path);

    match cli.command {
        Command::Extract {
            template,
            image,
            shapes,
            debug,
            debug_dir,
            output: output_path,
            csv,
        } => {
            let template = Template::from_file(&paths::resolve_template_path(&template))?;
            let scan = image::open(&image)
                .with_context(|| format!("Failed to open image {}", image.display()))?
                .to_rgba8();
            let shapes = load_shapes(&shapes)?;

            let engine = TesseractEngine::from_config(&config)?;
            let pipeline = Pipeline::new(template, config, Box::new(engine));

            let debug_dir = debug_dir.or_else(|| debug.then(paths::get_debug_dir));
            let fields = match debug_dir {
                Some(dir) => {
                    let mut observer = DebugDumpObserver::new(&dir).with_context(|| {
                        format!("Failed to create debug directory {}", dir.display())
                    })?;
                    pipeline.extract_observed(&scan, &shapes, &mut observer)
                }
                None => pipeline.extract_observed(&scan, &shapes, &mut NoopObserver),
            };

            if let Some(csv_path) = csv {
                output::append_to_csv(&csv_path, &image, &fields)?;
                log(&format!("Appended result to {}", csv_path.display()));
            }
            match output_path {
                Some(path) => {
                    output::write_json(&path, &fields)?;
                    log(&format!("Saved to {}", path.display()));
                }
                None => println!("{}", output::to_json(&fields)?),
            }
            Ok(())
        }
        Command::Preview {
            template,
            image,
            out,
        } => {
            let template = Template::from_file(&paths::resolve_template_path(&template))?;
            let scan = match image {
                Some(path) => Some(
                    image::open(&path)
                        .with_context(|| format!("Failed to open image {}", path.display()))?
                        .to_rgba8(),
                ),
                None => None,
            };

            let preview = render_template_preview(&template, scan.as_ref());
            preview
                .save(&out)
                .with_context(|| format!("Failed to save {}", out.display()))?;
            log(&format!("Saved to {}", out.display()));
            Ok(())
        }
        Command::Check => {
            let engine = TesseractEngine::from_config(&config)?;
            let languages =
                available_languages(&engine.executable, engine.tessdata_dir.as_deref())?;
            log(&format!("Installed languages: {}", languages.join(", ")));

            let missing: Vec<&str> = [config.text_language.as_str(), config.mrz_language.as_str()]
                .into_iter()
                .filter(|lang| !languages.iter().any(|l| l == lang))
                .collect();
            if missing.is_empty() {
                log("Tesseract is ready");
                Ok(())
            } else {
                Err(anyhow!(
                    "Missing Tesseract language data: {}",
                    missing.join(", ")
                ))
            }
        }
    }
}
