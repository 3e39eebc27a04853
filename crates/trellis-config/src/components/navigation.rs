//! Navigation protocol configuration

use serde::{Deserialize, Serialize};

/// Default request header carrying the client's mounted chain
pub const DEFAULT_MOUNTED_HEADER: &str = "x-trellis-mounted";

/// Default response header marking a response as `segment` or `full`
pub const DEFAULT_RESPONSE_HEADER: &str = "x-trellis-response";

/// Header names used to negotiate segment navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Request header with the mounted chain (JSON array or comma list)
    pub mounted_header: String,
    /// Response header identifying segment vs. full responses
    pub response_header: String,
    /// Allow segment responses at all; when false every request renders
    /// a full document
    pub segments_enabled: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mounted_header: DEFAULT_MOUNTED_HEADER.to_string(),
            response_header: DEFAULT_RESPONSE_HEADER.to_string(),
            segments_enabled: true,
        }
    }
}
