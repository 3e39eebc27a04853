//! Shared router state

use crate::{Result, WebError};
use axum::http::HeaderName;
use std::sync::Arc;
use trellis_core::Trellis;

/// State handed to every view route
#[derive(Clone)]
pub struct TrellisState {
    trellis: Arc<Trellis>,
    mounted_header: HeaderName,
    response_header: HeaderName,
}

impl TrellisState {
    /// Wrap a service, validating its navigation header names
    pub fn new(trellis: Trellis) -> Result<Self> {
        let parse = |name: &str| {
            HeaderName::try_from(name.to_ascii_lowercase())
                .map_err(|e| WebError::Config(format!("invalid header name '{name}': {e}")))
        };
        let mounted_header = parse(&trellis.navigation().mounted_header)?;
        let response_header = parse(&trellis.navigation().response_header)?;
        Ok(Self {
            trellis: Arc::new(trellis),
            mounted_header,
            response_header,
        })
    }

    pub fn trellis(&self) -> &Trellis {
        &self.trellis
    }

    /// Request header carrying the client's mounted chain
    pub fn mounted_header(&self) -> &HeaderName {
        &self.mounted_header
    }

    /// Response header marking `segment` or `full`
    pub fn response_header(&self) -> &HeaderName {
        &self.response_header
    }
}

impl std::fmt::Debug for TrellisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrellisState")
            .field("trellis", &self.trellis)
            .field("mounted_header", &self.mounted_header)
            .field("response_header", &self.response_header)
            .finish()
    }
}
