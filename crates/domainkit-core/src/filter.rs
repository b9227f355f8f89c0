use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Case-insensitive file extension match, e.g. `msi` or `tar.gz`.
///
/// `.msi` and `*.msi` are accepted as spellings of `msi`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct ExtensionFilter {
    extension: String,
}

impl ExtensionFilter {
    pub fn new(extension: &str) -> Self {
        let extension = extension
            .trim()
            .trim_start_matches('*')
            .trim_start_matches('.')
            .to_ascii_lowercase();
        Self { extension }
    }

    pub fn as_str(&self) -> &str {
        &self.extension
    }

    /// An empty filter matches every file.
    pub fn matches(&self, path: &Path) -> bool {
        if self.extension.is_empty() {
            return true;
        }
        let Some(file_name) = path.file_name().and_then(|value| value.to_str()) else {
            return false;
        };
        let lower = file_name.to_ascii_lowercase();
        let Some(stem) = lower.strip_suffix(&self.extension) else {
            return false;
        };
        stem.len() > 1 && stem.ends_with('.')
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new("msi")
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extension.is_empty() {
            return f.write_str("*");
        }
        write!(f, "*.{}", self.extension)
    }
}

impl From<String> for ExtensionFilter {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<ExtensionFilter> for String {
    fn from(filter: ExtensionFilter) -> Self {
        filter.extension
    }
}
