mod filter;
mod version;

pub use filter::ExtensionFilter;
pub use version::{FileVersion, VersionError};

#[cfg(test)]
mod tests;
