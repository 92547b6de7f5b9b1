//! Result writers.
//!
//! Extracted fields are printed as JSON, and can also be appended to a CSV
//! file in append-only mode, one row per processed document.

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Serializes the zone → text mapping as pretty JSON.
pub fn to_json(fields: &BTreeMap<String, String>) -> Result<String> {
    serde_json::to_string_pretty(fields).context("Failed to serialize fields")
}

/// Writes the JSON result to a file.
pub fn write_json(path: &Path, fields: &BTreeMap<String, String>) -> Result<()> {
    let json = to_json(fields)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Header row: timestamp, source image, then one column per zone.
fn csv_header<'a>(zone_names: impl Iterator<Item = &'a String>) -> String {
    let mut columns = vec!["timestamp".to_string(), "image".to_string()];
    columns.extend(zone_names.map(|name| escape_csv(name)));
    columns.join(",")
}

/// Initializes CSV file with header if it doesn't exist or is empty.
///
/// If the file exists and has content, this does nothing (preserves existing data).
pub fn init_csv(path: &Path, fields: &BTreeMap<String, String>) -> Result<()> {
    if path.exists() {
        let file = File::open(path).context("Failed to open existing CSV")?;
        let reader = BufReader::new(file);
        if reader.lines().next().is_some() {
            return Ok(());
        }
    }

    let mut file = File::create(path).context("Failed to create CSV file")?;
    writeln!(file, "{}", csv_header(fields.keys())).context("Failed to write CSV header")?;
    Ok(())
}

/// Appends one result row to the CSV file, writing the header first if needed.
///
/// Columns follow the zone-name order of `fields`, which matches the header
/// for any document extracted with the same template.
pub fn append_to_csv(path: &Path, image_path: &Path, fields: &BTreeMap<String, String>) -> Result<()> {
    init_csv(path, fields)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open CSV for append")?;

    let mut columns = vec![
        Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        escape_csv(&image_path.display().to_string()),
    ];
    columns.extend(fields.values().map(|value| escape_csv(value)));

    writeln!(file, "{}", columns.join(",")).context("Failed to write CSV row")?;
    Ok(())
}

/// Quotes a value containing a comma, quote or line break.
fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
