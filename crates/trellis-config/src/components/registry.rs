//! Registry manifest location

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the build-generated registry manifest lives
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path to the manifest (`.json` or `.toml`)
    pub manifest_path: Option<PathBuf>,
}
