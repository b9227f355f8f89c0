use std::io;
use std::path::PathBuf;

use domainkit_core::VersionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    /// Recoverable: the file is skipped and the scan continues.
    #[error("cannot parse a version from '{file_name}': {source}")]
    Parse {
        path: PathBuf,
        file_name: String,
        #[source]
        source: VersionError,
    },
    #[error("no valid candidate found in {searched}")]
    NotFound { searched: String },
    #[error("failed to read directory {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LocatorError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
