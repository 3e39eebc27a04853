//! HTTP error responses
//!
//! Full-page requests get a small generic HTML document with the status
//! code and nothing from the error itself. Segment requests get a JSON body
//! telling the client to fall back to a full page load; partial markup is
//! never sent.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use trellis_core::TrellisError;

/// Errors surfaced by the web layer
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Registry loading or rendering failed
    #[error("{source}")]
    Trellis {
        #[source]
        source: TrellisError,
        /// Whether the client asked for a segment
        segment: bool,
    },

    /// The host's view handler failed before rendering
    #[error("View handler failed: {error:#}")]
    Handler {
        error: anyhow::Error,
        segment: bool,
    },
}

/// Result type for web operations
pub type Result<T> = std::result::Result<T, WebError>;

impl From<TrellisError> for WebError {
    fn from(source: TrellisError) -> Self {
        Self::Trellis {
            source,
            segment: false,
        }
    }
}

impl From<trellis_config::ConfigError> for WebError {
    fn from(err: trellis_config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl WebError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Trellis { source, .. } if source.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short category name for logs and segment error bodies
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Trellis { source, .. } => source.category(),
            Self::Handler { .. } => "handler",
        }
    }

    fn is_segment(&self) -> bool {
        matches!(
            self,
            Self::Trellis { segment: true, .. } | Self::Handler { segment: true, .. }
        )
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_segment() {
            let body = json!({
                "error": self.category(),
                "status": status.as_u16(),
                "reload": true,
            });
            return (status, axum::Json(body)).into_response();
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            error_document(status),
        )
            .into_response()
    }
}

/// Generic error page for a status code
pub fn error_document(status: StatusCode) -> String {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\
         <body><h1>{code}</h1><p>{reason}</p></body></html>"
    )
}
