//! Detected-shape input files.
//!
//! Contour detection happens outside this crate; its result arrives as a
//! JSON array of minimal oriented rectangles in image pixels:
//! `[{"cx": 120.5, "cy": 48, "width": 30, "height": 12, "angle": -2.5}]`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::geometry::Shape;

/// Parses a JSON shape list.
pub fn parse_shapes(json: &str) -> Result<Vec<Shape>> {
    let shapes: Vec<Shape> =
        serde_json::from_str(json).context("Failed to parse shape list")?;
    Ok(shapes)
}

/// Reads a JSON shape list from disk.
pub fn load_shapes(path: &Path) -> Result<Vec<Shape>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shapes from {}", path.display()))?;
    let shapes = parse_shapes(&contents)?;
    crate::log(&format!("Loaded {} shapes from {}", shapes.len(), path.display()));
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_shapes() {
        let shapes = parse_shapes(
            r#"[{"cx": 10, "cy": 20, "width": 30, "height": 4},
                {"cx": 1.5, "cy": 2.5, "width": 3, "height": 4, "angle": 45}]"#,
        )
        .unwrap();

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0], Shape::new(10.0, 20.0, 30.0, 4.0));
        assert_eq!(shapes[1].angle, 45.0);
    }

    #[test]
    fn test_parse_shapes_rejects_missing_extent() {
        assert!(parse_shapes(r#"[{"cx": 10, "cy": 20, "width": 30}]"#).is_err());
    }

    #[test]
    fn test_load_shapes_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shapes.json");
        fs::write(&path, "[]").unwrap();

        assert!(load_shapes(&path).unwrap().is_empty());
        assert!(load_shapes(&dir.path().join("missing.json")).is_err());
    }
}
