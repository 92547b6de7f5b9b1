use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::process::Command;

const EXECUTABLE_NAME: &str = if cfg!(windows) {
    "tesseract.exe"
} else {
    "tesseract"
};

/// Returns the directory for a locally installed Tesseract
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("passport-zones")
        .join("tesseract")
}

fn common_install_dirs() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\Tesseract-OCR"),
            PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/opt/homebrew/bin"),
            PathBuf::from("/usr/bin"),
        ]
    }
}

fn common_tessdata_dirs() -> Vec<PathBuf> {
    if cfg!(windows) {
        common_install_dirs()
            .into_iter()
            .map(|dir| dir.join("tessdata"))
            .collect()
    } else {
        vec![
            PathBuf::from("/usr/share/tesseract-ocr/5/tessdata"),
            PathBuf::from("/usr/share/tesseract-ocr/4.00/tessdata"),
            PathBuf::from("/usr/share/tessdata"),
            PathBuf::from("/usr/local/share/tessdata"),
            PathBuf::from("/opt/homebrew/share/tessdata"),
        ]
    }
}

/// Finds the Tesseract executable: explicit override, our local dir, PATH,
/// then common install locations.
pub fn find_tesseract_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!("Configured tesseract not found: {}", path.display()));
    }

    let local_exe = get_tesseract_dir().join(EXECUTABLE_NAME);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for dir in common_install_dirs() {
        let p = dir.join(EXECUTABLE_NAME);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory holding every requested language.
///
/// Returns None when no candidate has them all, in which case Tesseract
/// falls back to its compiled-in data path.
pub fn find_tessdata_dir(explicit: Option<&Path>, languages: &[&str]) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let has_all = |dir: &Path| {
        languages
            .iter()
            .all(|lang| dir.join(format!("{}.traineddata", lang)).exists())
    };

    let mut candidates = vec![get_tesseract_dir().join("tessdata")];
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }
    candidates.extend(common_tessdata_dirs());

    candidates.into_iter().find(|dir| has_all(dir))
}

/// Lists the languages the given Tesseract executable can load.
pub fn available_languages(executable: &Path, tessdata: Option<&Path>) -> Result<Vec<String>> {
    let mut command = Command::new(executable);
    command.arg("--list-langs");
    if let Some(dir) = tessdata {
        command.arg("--tessdata-dir").arg(dir);
    }
    let output = command
        .output()
        .with_context(|| "failed to run tesseract --list-langs")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("tesseract --list-langs failed: {}", stderr.trim()));
    }
    Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
}

/// The first line of `--list-langs` output is a header.
fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_language_list() {
        let stdout = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\nrus\n\n";
        assert_eq!(parse_language_list(stdout), vec!["eng", "osd", "rus"]);
    }

    #[test]
    fn test_explicit_executable_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("tesseract");
        assert!(find_tesseract_executable(Some(&missing)).is_err());

        std::fs::write(&missing, "").unwrap();
        assert_eq!(find_tesseract_executable(Some(&missing)).unwrap(), missing);
    }

    #[test]
    fn test_explicit_tessdata_wins() {
        let dir = tempdir().unwrap();
        assert_eq!(
            find_tessdata_dir(Some(dir.path()), &["rus"]),
            Some(dir.path().to_path_buf())
        );
    }
}
