//! Path normalization utilities.
//!
//! Every path handed to the hub goes through here first:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `paths_equal` - case-insensitive equality of normalized paths
//! - `fold_key` - the case-folded key the hub indexes files by

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Canonical parent joined with the file name (file does not exist)
/// - Return as-is if already absolute
/// - Join with current directory if relative
///
/// # Example
/// ```ignore
/// use livemd::utils::path::normalize_path;
/// let abs = normalize_path(Path::new("./docs/notes.md"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
            && let Ok(parent) = parent.canonicalize()
        {
            return parent.join(name);
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Case-folded string key for a normalized path.
///
/// Two paths that only differ in letter case map to the same key.
pub fn fold_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Compare two paths after normalization, ignoring letter case.
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    fold_key(&normalize_path(a)) == fold_key(&normalize_path(b))
}
