use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    // Copy bundled templates and config next to the executable
    let Some(target_dir) = target_dir() else {
        return;
    };
    copy_templates(&target_dir);
    copy_config(&target_dir);
}

/// OUT_DIR is target/<profile>/build/passport-zones-xxx/out; the executable
/// lives three levels up.
fn target_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    Path::new(&out_dir).ancestors().nth(3).map(Path::to_path_buf)
}

/// Copies the templates folder so the executable can resolve bundled template names.
fn copy_templates(target_dir: &Path) {
    let template_src = Path::new("templates");
    let template_dst = target_dir.join("templates");

    if template_src.exists() {
        copy_dir_recursive(template_src, &template_dst);
        // Tell Cargo to re-run if templates change
        println!("cargo:rerun-if-changed=templates/");
    }
}

/// Recursively copies a directory and its contents.
fn copy_dir_recursive(src: &Path, dst: &Path) {
    let _ = fs::create_dir_all(dst);

    if let Ok(entries) = fs::read_dir(src) {
        for entry in entries.flatten() {
            let src_path = entry.path();
            let dst_path = dst.join(entry.file_name());

            if src_path.is_dir() {
                copy_dir_recursive(&src_path, &dst_path);
            } else {
                let _ = fs::copy(&src_path, &dst_path);
            }
        }
    }
}

/// Copies config.json to the target directory.
fn copy_config(target_dir: &Path) {
    let config_src = Path::new("config.json");

    if config_src.exists() {
        let _ = fs::copy(config_src, target_dir.join("config.json"));
        println!("cargo:rerun-if-changed=config.json");
    }
}
