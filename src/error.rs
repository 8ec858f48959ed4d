use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading an LCOV report.
///
/// Malformed records are not represented here: they are skipped during the
/// scan and never abort a computation.
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("LCOV file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read LCOV file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoverageError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            CoverageError::NotFound { path }
        } else {
            CoverageError::Read { path, source }
        }
    }
}
