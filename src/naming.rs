//! Timestamped output file names.

use chrono::Local;
use std::path::{Path, PathBuf};

/// Timestamp used in generated file names, second granularity.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `<dir>/<prefix>_<timestamp>.<ext>`, with `_1`, `_2`, ... appended when a
/// file of that name already exists.
///
/// Probing is not atomic: two processes racing on the same directory in the
/// same second can still pick the same name.
pub fn unique_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    unique_path_with_stamp(dir, prefix, &timestamp(), extension)
}

fn unique_path_with_stamp(dir: &Path, prefix: &str, stamp: &str, extension: &str) -> PathBuf {
    let candidate = dir.join(format!("{prefix}_{stamp}.{extension}"));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{prefix}_{stamp}_{n}.{extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
