//! Error reporting hook
//!
//! Failures during context building and rendering are handed to an
//! [`ErrorReporter`] together with what is known about the request before
//! the host turns them into a response.

use crate::error::TrellisError;
use parking_lot::Mutex;

/// Request details attached to a reported error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: String,
    pub uri: String,
    /// Logical view path the request was bound to
    pub view: String,
    /// Whether the client asked for a segment
    pub segment: bool,
}

/// Receives errors raised while serving a request
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &TrellisError, meta: &RequestMeta);
}

/// Reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &TrellisError, meta: &RequestMeta) {
        if error.is_not_found() {
            tracing::debug!(
                method = %meta.method,
                uri = %meta.uri,
                view = %meta.view,
                "View not found"
            );
            return;
        }
        tracing::error!(
            method = %meta.method,
            uri = %meta.uri,
            view = %meta.view,
            segment = meta.segment,
            category = error.category(),
            error = %error,
            "Request failed"
        );
    }
}

/// Keeps reported errors in memory, mainly for tests
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<(String, RequestMeta)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category and request of every report so far
    pub fn reports(&self) -> Vec<(String, RequestMeta)> {
        self.reports.lock().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, error: &TrellisError, meta: &RequestMeta) {
        self.reports
            .lock()
            .push((error.category().to_string(), meta.clone()));
    }
}
