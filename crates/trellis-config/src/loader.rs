//! Configuration file loading

use crate::{ConfigError, Result, TrellisConfig};
use std::path::Path;

/// Supported on-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    #[cfg(feature = "toml")]
    Toml,
    /// YAML (`.yaml`, `.yml`)
    #[cfg(feature = "yaml")]
    Yaml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            #[cfg(feature = "toml")]
            "toml" => Ok(Self::Toml),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "toml")]
            Self::Toml => "TOML",
            #[cfg(feature = "yaml")]
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }
}

/// Loads and validates [`TrellisConfig`]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a configuration file
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<TrellisConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let config = Self::from_str_with_format(&contents, format)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_str_with_format(contents: &str, format: ConfigFormat) -> Result<TrellisConfig> {
        let parse_err = |message: String| ConfigError::Parse {
            format: format.name(),
            message,
        };

        let config: TrellisConfig = match format {
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| parse_err(e.to_string()))?,
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => {
                if contents.trim().is_empty() {
                    TrellisConfig::default()
                } else {
                    serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))?
                }
            }
            ConfigFormat::Json => {
                serde_json::from_str(contents).map_err(|e| parse_err(e.to_string()))?
            }
        };

        config.validate()?;
        Ok(config)
    }
}
