//! Picks the highest-versioned installer out of a directory tree.
//!
//! File names carry a `major.minor.build.revision` token. Files without one
//! are skipped and reported; the directory itself failing to read, or nothing
//! parseable being found, is an error for the caller to handle.

mod error;
mod scan;
mod select;
mod types;

pub use error::LocatorError;
pub use scan::{parse_version, scan};
pub use select::{locate_highest, select_highest};
pub use types::{Candidate, LocateReport, LocatorOptions, SkippedFile};
