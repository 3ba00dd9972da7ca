//! Subcommands of the `tdlab` binary

use std::path::{Path, PathBuf};

pub mod experiment;
pub mod train;

/// Normalize a `--summary` target to a `.json` file path
///
/// A directory target (trailing separator or no file name) gets
/// `default_name` appended; any other extension is replaced by `json`.
pub(crate) fn sanitize_summary_path(raw: &Path, default_name: &str) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push(default_name);
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}
