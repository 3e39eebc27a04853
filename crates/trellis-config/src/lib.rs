//! # Trellis Configuration
//!
//! Type-safe configuration for the Trellis rendering server: bind address,
//! render mode and document shell, navigation header names, the request
//! header allowlist for render contexts, and the location of the registry
//! manifest.
//!
//! Every section has a `Default` implementation and every field is
//! optional on disk, so an empty file is a valid configuration.
//!
//! ```rust,no_run
//! use trellis_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("trellis.toml").await?;
//!     println!("listening on {}", config.server.address());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod error;
mod loader;

pub use components::*;
pub use error::{ConfigError, Result};
pub use loader::{ConfigFormat, ConfigLoader};

use serde::{Deserialize, Serialize};

/// Root configuration for a Trellis deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrellisConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Render pipeline and document shell settings
    pub render: RenderConfig,
    /// Navigation protocol header names
    pub navigation: NavigationConfig,
    /// Render context header policy
    pub context: ContextConfig,
    /// Registry manifest location
    pub registry: RegistryConfig,
}

impl TrellisConfig {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.render.stream_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "render.stream_buffer".to_string(),
                value: "0 (must be at least 1)".to_string(),
            });
        }
        if self.navigation.mounted_header.trim().is_empty() {
            return Err(ConfigError::MissingValue(
                "navigation.mounted_header".to_string(),
            ));
        }
        if self
            .navigation
            .mounted_header
            .eq_ignore_ascii_case(&self.navigation.response_header)
        {
            return Err(ConfigError::InvalidValue {
                field: "navigation.response_header".to_string(),
                value: format!(
                    "{} (must differ from navigation.mounted_header)",
                    self.navigation.response_header
                ),
            });
        }
        if self.render.data_script_id.trim().is_empty() {
            return Err(ConfigError::MissingValue("render.data_script_id".to_string()));
        }
        Ok(())
    }
}
