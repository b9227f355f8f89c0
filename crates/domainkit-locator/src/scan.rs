use std::io;
use std::path::{Path, PathBuf};

use domainkit_core::{ExtensionFilter, FileVersion};
use walkdir::{DirEntry, WalkDir};

use crate::error::LocatorError;
use crate::types::{Candidate, LocatorOptions};

/// Lazily walks `root` and yields files accepted by `filter`.
///
/// Nothing touches the filesystem until the first item is pulled; a missing
/// or non-directory root is then reported as the first item. Entries are
/// visited in file-name order, and symlinks to files count as files. Calling
/// `scan` again re-reads the filesystem from scratch.
pub fn scan<'a>(
    root: &'a Path,
    filter: &'a ExtensionFilter,
    options: LocatorOptions,
) -> impl Iterator<Item = Result<PathBuf, LocatorError>> + 'a {
    std::iter::once_with(move || check_root(root)).flat_map(move |checked| {
        let (failure, walk) = match checked {
            Ok(()) => (None, Some(walker(root, options).into_iter())),
            Err(err) => (Some(Err(err)), None),
        };
        failure
            .into_iter()
            .chain(walk.into_iter().flatten().filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => return Some(Err(access_error(root, err))),
                };
                if !is_file_entry(&entry) || !filter.matches(entry.path()) {
                    return None;
                }
                Some(Ok(entry.into_path()))
            }))
    })
}

/// Builds a candidate from the version token embedded in the file's base name.
pub fn parse_version(path: &Path) -> Result<Candidate, LocatorError> {
    let file_name = path
        .file_name()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base_name = path
        .file_stem()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default();

    let version = FileVersion::find_in(&base_name).map_err(|source| LocatorError::Parse {
        path: path.to_path_buf(),
        file_name,
        source,
    })?;
    Ok(Candidate {
        path: path.to_path_buf(),
        version,
    })
}

fn walker(root: &Path, options: LocatorOptions) -> WalkDir {
    let walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if options.recursive {
        walker
    } else {
        walker.max_depth(1)
    }
}

// Directory links are not descended into, but a link to a file is a candidate.
fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn check_root(root: &Path) -> Result<(), LocatorError> {
    let metadata = std::fs::metadata(root).map_err(|source| LocatorError::Access {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(LocatorError::Access {
            path: root.to_path_buf(),
            source: io::Error::other("path is not a directory"),
        });
    }
    Ok(())
}

fn access_error(root: &Path, err: walkdir::Error) -> LocatorError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    LocatorError::Access {
        path,
        source: err.into(),
    }
}
