use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::render::RenderError;

/// Failure of a hub operation. A failed operation leaves hub state untouched.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("not tracked: {}", .0.display())]
    NotFound(PathBuf),

    #[error("already tracked: {}", .0.display())]
    AlreadyTracked(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cannot watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl HubError {
    /// Stat failure: a missing file is `NotFound`, anything else is `Read`.
    pub(super) fn from_stat(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Read { path, source }
        }
    }

    /// The path that was not a regular file.
    pub(super) fn not_a_file(path: PathBuf) -> Self {
        let source = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
        Self::Read { path, source }
    }
}
