//! Compiled-template scratch directory resolution.

use std::fs;
use std::path::{Path, PathBuf};

/// Preferred scratch location, relative to the project root.
pub const CACHE_SUBDIR: &str = "var/cache/templates";

/// Temp-dir fallback name when the primary location is not writable.
pub const FALLBACK_CACHE_DIR: &str = "montage-template-cache";

/// Resolves a writable scratch directory for the engine.
///
/// Prefers `{root}/var/cache/templates`, creating it if absent; when
/// creation fails or the directory is not writable, falls back to a
/// distinctly-named subdirectory of the system temp dir. Creation races are
/// tolerated: another process winning the mkdir is not an error.
pub fn writable_cache_dir(root: &Path) -> PathBuf {
    let primary = root.join(CACHE_SUBDIR);
    if ensure_writable(&primary) {
        return primary;
    }

    log::debug!(
        "cache dir {} not writable, falling back to system temp",
        primary.display()
    );
    let fallback = std::env::temp_dir().join(FALLBACK_CACHE_DIR);
    let _ = fs::create_dir_all(&fallback);
    fallback
}

fn ensure_writable(dir: &Path) -> bool {
    if fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".write-probe");
    match fs::write(&probe, b"") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
