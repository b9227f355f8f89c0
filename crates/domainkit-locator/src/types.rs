use std::path::PathBuf;

use domainkit_core::{ExtensionFilter, FileVersion};
use serde::Serialize;

/// A discovered file paired with the version parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
    pub version: FileVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocateReport {
    pub root: PathBuf,
    pub extension: ExtensionFilter,
    pub selected: Candidate,
    pub skipped: Vec<SkippedFile>,
    pub scanned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    pub recursive: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self { recursive: true }
    }
}
