use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ASCII digits only; `\d` would also match other Unicode digits.
const FILE_VERSION_PATTERN: &str = r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+";

/// Four-part `major.minor.build.revision` version as used by MSI packages and
/// Windows file resources.
///
/// Ordering is component-wise: major, then minor, then build, then revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FileVersion {
    pub major: u64,
    pub minor: u64,
    pub build: u64,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("no four-part version token found in '{0}'")]
    MissingToken(String),
    #[error("malformed version '{input}': expected {expected} dot-separated numbers")]
    Malformed {
        input: String,
        expected: &'static str,
    },
    #[error("version component '{component}' in '{input}' does not fit in 64 bits")]
    ComponentOutOfRange { input: String, component: String },
}

impl FileVersion {
    pub const fn new(major: u64, minor: u64, build: u64, revision: u64) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    pub fn components(&self) -> [u64; 4] {
        [self.major, self.minor, self.build, self.revision]
    }

    /// Finds the first `N.N.N.N` token anywhere in `text`.
    ///
    /// Only the first match is considered; a later well-formed token does not
    /// rescue a first token whose components overflow.
    pub fn find_in(text: &str) -> Result<Self, VersionError> {
        let Some(found) = file_version_regex().and_then(|pattern| pattern.find(text)) else {
            return Err(VersionError::MissingToken(text.to_string()));
        };
        parse_components(found.as_str(), 4, "4")
    }

    /// Parses an installed-product version such as `10.2.3`.
    ///
    /// Accepts two to four components; missing trailing components are zero.
    pub fn parse_lenient(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let count = trimmed.split('.').count();
        if !(2..=4).contains(&count) {
            return Err(VersionError::Malformed {
                input: trimmed.to_string(),
                expected: "2 to 4",
            });
        }
        parse_components(trimmed, count, "2 to 4")
    }
}

fn file_version_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(FILE_VERSION_PATTERN).ok())
        .as_ref()
}

fn parse_components(
    input: &str,
    count: usize,
    expected: &'static str,
) -> Result<FileVersion, VersionError> {
    let mut parts = [0_u64; 4];
    let mut seen = 0;
    for (slot, raw) in parts.iter_mut().zip(input.split('.')) {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VersionError::Malformed {
                input: input.to_string(),
                expected,
            });
        }
        *slot = raw
            .parse::<u64>()
            .map_err(|_| VersionError::ComponentOutOfRange {
                input: input.to_string(),
                component: raw.to_string(),
            })?;
        seen += 1;
    }
    if seen != count || input.split('.').count() != count {
        return Err(VersionError::Malformed {
            input: input.to_string(),
            expected,
        });
    }

    let [major, minor, build, revision] = parts;
    Ok(FileVersion::new(major, minor, build, revision))
}

impl FromStr for FileVersion {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_components(input.trim(), 4, "4")
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl From<FileVersion> for String {
    fn from(version: FileVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for FileVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
