//! Output naming for work items.
//!
//! Turns an item label into a Linux-safe file stem inside the output folder,
//! and picks a file extension for direct URLs.

mod path;
mod sanitize;

use std::path::{Path, PathBuf};

pub use path::extension_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

/// Stem used when a label sanitizes to nothing.
const DEFAULT_STEM: &str = "trailer";

/// Extension used when a direct URL does not reveal one.
pub const DEFAULT_EXTENSION: &str = "mp4";

/// Derives a safe file stem from a label (no extension).
///
/// # Examples
///
/// - `stem_for_label("Alien: Romulus")` → `"Alien:_Romulus"`
/// - `stem_for_label("../..")` → `"trailer"`
pub fn stem_for_label(label: &str) -> String {
    let sanitized = sanitize_filename_for_linux(label);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_STEM.to_string()
    } else {
        sanitized
    }
}

/// Output path (without extension) for an item label inside `dir`.
pub fn output_stem(dir: &Path, label: &str) -> PathBuf {
    dir.join(stem_for_label(label))
}
