//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file contents could not be parsed
    #[error("Failed to parse {format} configuration: {message}")]
    Parse {
        /// Format that was attempted
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// The file extension does not map to a supported format
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A field holds a value outside its allowed range
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Dotted field path
        field: String,
        /// Offending value with a short explanation
        value: String,
    },

    /// A required field is empty
    #[error("Missing required value: {0}")]
    MissingValue(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
