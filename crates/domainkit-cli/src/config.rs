use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use domainkit_core::ExtensionFilter;
use serde::Deserialize;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "domainkit.toml";

/// Defaults for task flags, read from `domainkit.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DomainkitConfig {
    pub(crate) locator: LocatorSection,
    pub(crate) minidriver: MinidriverSection,
    pub(crate) gmsa: GmsaSection,
    pub(crate) sql: SqlSection,
    pub(crate) cert: CertSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LocatorSection {
    pub(crate) extension: Option<ExtensionFilter>,
    pub(crate) recursive: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MinidriverSection {
    pub(crate) share: Option<PathBuf>,
    pub(crate) product_name: Option<String>,
    pub(crate) extension: Option<ExtensionFilter>,
    pub(crate) expected_sha256: Option<String>,
    pub(crate) log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GmsaSection {
    pub(crate) domain: Option<String>,
    pub(crate) principals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SqlSection {
    pub(crate) setup_path: Option<PathBuf>,
    pub(crate) instance_name: Option<String>,
    pub(crate) features: Vec<String>,
    pub(crate) sysadmins: Vec<String>,
    pub(crate) install_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CertSection {
    pub(crate) ca_config: Option<String>,
    pub(crate) template: Option<String>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) key_bits: Option<u32>,
    pub(crate) organization: Option<String>,
    pub(crate) organizational_unit: Option<String>,
    pub(crate) locality: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) country: Option<String>,
}

pub(crate) fn parse_config(content: &str) -> Result<DomainkitConfig> {
    toml::from_str(content).context("failed parsing domainkit config")
}

/// Loads the explicit config file, or `domainkit.toml` under `cwd` when one
/// exists. An explicit path that is missing is an error; a missing default is
/// an empty config.
pub(crate) fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<DomainkitConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(DEFAULT_CONFIG_FILE);
            if !candidate.is_file() {
                return Ok(DomainkitConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed reading config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("invalid config file: {}", path.display()))
}

/// Picks the command-line value over the file value, failing with a message
/// that names both places the value can come from.
pub(crate) fn required<T>(
    flag_value: Option<T>,
    file_value: Option<T>,
    flag: &str,
    key: &str,
) -> Result<T> {
    flag_value.or(file_value).ok_or_else(|| {
        anyhow!("missing required value: pass {flag} or set `{key}` in the config file")
    })
}

/// Command-line list when non-empty, else the file list.
pub(crate) fn list_or(flag_values: Vec<String>, file_values: &[String]) -> Vec<String> {
    if flag_values.is_empty() {
        file_values.to_vec()
    } else {
        flag_values
    }
}
