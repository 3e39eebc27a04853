//! Navigation requests

use crate::{ClientError, Result};
use async_trait::async_trait;
use std::time::Duration;
use trellis_config::{NavigationConfig, DEFAULT_MOUNTED_HEADER, DEFAULT_RESPONSE_HEADER};
use trellis_core::{encode_mounted_chain, ResponseKind, SegmentResponse};

/// What the server sent back for a navigation
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationReply {
    /// Segment to graft below a swap point
    Segment(SegmentResponse),
    /// Complete document
    Full(String),
}

/// Fetches a target with the mounted chain attached
#[async_trait]
pub trait NavigationTransport: Send + Sync + 'static {
    async fn fetch(&self, target: &str, mounted: &[String]) -> Result<NavigationReply>;
}

/// Header names the transport sends and reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolHeaders {
    pub mounted: String,
    pub response: String,
}

impl Default for ProtocolHeaders {
    fn default() -> Self {
        Self {
            mounted: DEFAULT_MOUNTED_HEADER.to_string(),
            response: DEFAULT_RESPONSE_HEADER.to_string(),
        }
    }
}

impl From<&NavigationConfig> for ProtocolHeaders {
    fn from(config: &NavigationConfig) -> Self {
        Self {
            mounted: config.mounted_header.clone(),
            response: config.response_header.clone(),
        }
    }
}

/// Transport over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    headers: ProtocolHeaders,
    timeout: Duration,
}

impl HttpTransport {
    /// Transport for a server at `base_url` (scheme, host and port)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: ProtocolHeaders::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Use non-default header names
    pub fn with_headers(mut self, headers: ProtocolHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, target: &str) -> String {
        format!("{}{}", self.base_url, target)
    }
}

#[async_trait]
impl NavigationTransport for HttpTransport {
    async fn fetch(&self, target: &str, mounted: &[String]) -> Result<NavigationReply> {
        let mut request = self.client.get(self.url(target)).timeout(self.timeout);
        if !mounted.is_empty() {
            request = request.header(self.headers.mounted.as_str(), encode_mounted_chain(mounted));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                target: target.to_string(),
            });
        }

        let kind = response
            .headers()
            .get(self.headers.response.as_str())
            .and_then(|v| v.to_str().ok())
            .and_then(ResponseKind::parse)
            .unwrap_or(ResponseKind::Full);
        tracing::debug!(target = %target, kind = kind.as_str(), "Navigation response");

        match kind {
            ResponseKind::Segment => response
                .json::<SegmentResponse>()
                .await
                .map(NavigationReply::Segment)
                .map_err(|e| ClientError::Decode(e.to_string())),
            ResponseKind::Full => Ok(NavigationReply::Full(response.text().await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_target() {
        let transport = HttpTransport::new("http://127.0.0.1:3000/");
        assert_eq!(transport.url("/users/1"), "http://127.0.0.1:3000/users/1");
    }
}
