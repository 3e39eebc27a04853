//! HTTP server configuration

use serde::{Deserialize, Serialize};

/// Bind address and static asset settings for the rendering server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Directory served as static assets (client bundle, stylesheets)
    pub static_dir: Option<String>,
    /// Maximum request body size in megabytes
    pub max_request_size_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: None,
            max_request_size_mb: 10,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for parsing into a socket address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Body limit in bytes, saturating at `usize::MAX`
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_size_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_joins_host_and_port() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config: ServerConfig = toml::from_str("port = 4000").unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_request_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn huge_body_limit_saturates() {
        let config = ServerConfig {
            max_request_size_mb: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.max_request_bytes(), usize::MAX);
    }
}
