use std::path::Path;

use domainkit_core::ExtensionFilter;
use tracing::{debug, info, warn};

use crate::error::LocatorError;
use crate::scan::{parse_version, scan};
use crate::types::{Candidate, LocateReport, LocatorOptions, SkippedFile};

/// Returns the candidate with the highest version.
///
/// Ties keep the candidate encountered first.
pub fn select_highest<I>(candidates: I) -> Result<Candidate, LocatorError>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates
        .into_iter()
        .reduce(|best, next| {
            if next.version > best.version {
                next
            } else {
                best
            }
        })
        .ok_or_else(|| LocatorError::NotFound {
            searched: "an empty candidate set".to_string(),
        })
}

/// Scans `root`, skips files without a version token and selects the highest
/// remaining candidate.
pub fn locate_highest(
    root: &Path,
    filter: &ExtensionFilter,
    options: LocatorOptions,
) -> Result<LocateReport, LocatorError> {
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();
    let mut scanned = 0_usize;

    for path in scan(root, filter, options) {
        let path = path?;
        scanned += 1;
        match parse_version(&path) {
            Ok(candidate) => {
                debug!(
                    path = %candidate.path.display(),
                    version = %candidate.version,
                    "found versioned candidate"
                );
                candidates.push(candidate);
            }
            Err(err) if err.is_recoverable() => {
                warn!(path = %path.display(), reason = %err, "skipping file");
                skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let selected = match pick_candidate(candidates) {
        Ok(selected) => selected,
        Err(LocatorError::NotFound { .. }) => {
            warn!(
                root = %root.display(),
                filter = %filter,
                scanned,
                skipped = skipped.len(),
                "no valid candidate found"
            );
            return Err(LocatorError::NotFound {
                searched: format!("{} matching {filter}", root.display()),
            });
        }
        Err(err) => return Err(err),
    };

    info!(
        path = %selected.path.display(),
        version = %selected.version,
        "selected highest version"
    );
    Ok(LocateReport {
        root: root.to_path_buf(),
        extension: filter.clone(),
        selected,
        skipped,
        scanned,
    })
}

pub(crate) fn pick_candidate(mut candidates: Vec<Candidate>) -> Result<Candidate, LocatorError> {
    if candidates.len() == 1 {
        if let Some(only) = candidates.pop() {
            return Ok(only);
        }
    }
    select_highest(candidates)
}
