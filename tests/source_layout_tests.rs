/// Source layout checks
/// Keeps every Rust line within the 100-column width used across the crate
use std::fs;
use std::path::{Path, PathBuf};

const MAX_WIDTH: usize = 100;

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn test_lines_fit_width() {
    eprintln!("\n=== TEST: Source lines fit {} columns ===", MAX_WIDTH);
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    rust_files(&root.join("src"), &mut files);
    rust_files(&root.join("tests"), &mut files);
    assert!(!files.is_empty());

    let mut too_wide = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        for (n, line) in content.lines().enumerate() {
            // Doc diagrams are exempt; rustfmt leaves comments alone too.
            if line.trim_start().starts_with("//") {
                continue;
            }
            if line.chars().count() > MAX_WIDTH {
                too_wide.push(format!("{}:{}", file.display(), n + 1));
            }
        }
    }
    assert!(too_wide.is_empty(), "lines over {} columns: {:?}", MAX_WIDTH, too_wide);
    eprintln!("[TEST] ✓ {} files checked", files.len());
}
