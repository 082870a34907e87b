//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization and comparison
//!   (`normalize_path`, `paths_equal`, `fold_key`)

pub mod fs;

pub use fs::{fold_key, normalize_path, paths_equal};
