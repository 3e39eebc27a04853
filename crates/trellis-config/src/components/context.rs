//! Render context header policy

use serde::{Deserialize, Serialize};

/// Request headers copied into every render context unless overridden
pub const DEFAULT_SAFE_HEADERS: &[&str] = &["user-agent", "accept-language", "referer"];

/// Which inbound headers a render context may expose
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContextConfig {
    /// Base allowlist (case-insensitive)
    pub header_allowlist: Vec<String>,
    /// Additional headers the deployment explicitly opts into. Sensitive
    /// headers such as `cookie` or `authorization` are only exposed when
    /// listed here.
    pub extra_headers: Vec<String>,
    /// Locale used when `accept-language` is absent or unparseable
    pub default_locale: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            header_allowlist: DEFAULT_SAFE_HEADERS.iter().map(|h| h.to_string()).collect(),
            extra_headers: Vec::new(),
            default_locale: "en".to_string(),
        }
    }
}

impl ContextConfig {
    /// Combined allowlist, lowercased and deduplicated
    pub fn allowed_headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = self
            .header_allowlist
            .iter()
            .chain(self.extra_headers.iter())
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        headers.sort();
        headers.dedup();
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_safe_headers_only() {
        let headers = ContextConfig::default().allowed_headers();
        assert_eq!(headers, vec!["accept-language", "referer", "user-agent"]);
    }

    #[test]
    fn extra_headers_are_normalized() {
        let config = ContextConfig {
            extra_headers: vec!["X-Request-Id".to_string(), "User-Agent".to_string()],
            ..Default::default()
        };
        let headers = config.allowed_headers();
        assert!(headers.contains(&"x-request-id".to_string()));
        assert_eq!(headers.iter().filter(|h| *h == "user-agent").count(), 1);
    }
}
