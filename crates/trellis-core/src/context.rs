//! Per-request render context
//!
//! [`RenderContextBuilder::build`] turns an inbound request into a read-only
//! [`RenderContext`]. Only allowlisted headers survive; everything else
//! (cookies, authorization, forwarded client addresses) is dropped before
//! any layout or page can see it. Hosts add derived fields through an
//! ordered list of [`ContextEnricher`]s.

use crate::{Result, TrellisError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use trellis_config::ContextConfig;

/// Extension fields added by enrichers
pub type Extensions = serde_json::Map<String, serde_json::Value>;

/// The parts of an inbound request the core needs
///
/// Host adapters convert their framework's request type into this.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    /// HTTP method
    pub method: String,
    /// Path and query as received, e.g. `/users/1?tab=posts`
    pub uri: String,
    /// Header name/value pairs in arrival order
    pub headers: Vec<(String, String)>,
}

impl RawRequest {
    /// A GET request for a URI with no headers
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            uri: uri.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header (builder pattern)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, compared case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path component of the URI
    pub fn path(&self) -> &str {
        let end = self.uri.find(['?', '#']).unwrap_or(self.uri.len());
        &self.uri[..end]
    }

    /// Raw query string, without the leading `?`
    pub fn query_string(&self) -> Option<&str> {
        let start = self.uri.find('?')? + 1;
        let end = self.uri[start..]
            .find('#')
            .map(|i| start + i)
            .unwrap_or(self.uri.len());
        Some(&self.uri[start..end])
    }
}

/// Read-only context handed to every layout and page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Request path
    pub path: String,
    /// Path plus query
    pub url: String,
    /// Decoded query parameters (last value wins)
    pub query: BTreeMap<String, String>,
    /// Allowlisted headers, lowercased names
    pub headers: BTreeMap<String, String>,
    /// Preferred locale from `accept-language`
    pub locale: String,
    /// Host-defined fields from enrichers
    pub extensions: Extensions,
}

impl RenderContext {
    /// Minimal context for a path, mostly useful in tests and previews
    pub fn for_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            url: path.clone(),
            path,
            locale: "en".to_string(),
            ..Default::default()
        }
    }

    /// Look up an extension field
    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions.get(key)
    }

    /// The subset of the context transmitted to the browser
    ///
    /// Headers stay on the server; the client already knows its own.
    pub fn client_view(&self) -> ClientContext {
        ClientContext {
            path: self.path.clone(),
            url: self.url.clone(),
            query: self.query.clone(),
            locale: self.locale.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

/// Render context as embedded in a hydration payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientContext {
    pub path: String,
    pub url: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    pub locale: String,
    #[serde(default)]
    pub extensions: Extensions,
}

/// Host hook that derives extra context fields from a request
///
/// Enrichers run in registration order after the base fields are filled
/// in; each sees the fields added by the ones before it. Returning an error
/// fails the whole build.
pub trait ContextEnricher: Send + Sync {
    /// Name used in error reports
    fn name(&self) -> &str;

    /// Produce fields to merge into [`RenderContext::extensions`]
    fn enrich(&self, request: &RawRequest, context: &RenderContext) -> anyhow::Result<Extensions>;
}

struct FnEnricher<F> {
    name: String,
    f: F,
}

impl<F> ContextEnricher for FnEnricher<F>
where
    F: Fn(&RawRequest, &RenderContext) -> anyhow::Result<Extensions> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn enrich(&self, request: &RawRequest, context: &RenderContext) -> anyhow::Result<Extensions> {
        (self.f)(request, context)
    }
}

/// Builds [`RenderContext`]s from requests
#[derive(Clone)]
pub struct RenderContextBuilder {
    allowlist: Vec<String>,
    default_locale: String,
    enrichers: Vec<Arc<dyn ContextEnricher>>,
}

impl Default for RenderContextBuilder {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

impl RenderContextBuilder {
    /// Builder using the allowlist and default locale from configuration
    pub fn from_config(config: &ContextConfig) -> Self {
        Self {
            allowlist: config.allowed_headers(),
            default_locale: config.default_locale.clone(),
            enrichers: Vec::new(),
        }
    }

    /// Append an enricher
    pub fn with_enricher(mut self, enricher: impl ContextEnricher + 'static) -> Self {
        self.enrichers.push(Arc::new(enricher));
        self
    }

    /// Append a closure enricher
    pub fn with_enricher_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RawRequest, &RenderContext) -> anyhow::Result<Extensions> + Send + Sync + 'static,
    {
        self.with_enricher(FnEnricher {
            name: name.into(),
            f,
        })
    }

    /// Derive the context for one request
    pub fn build(&self, request: &RawRequest) -> Result<RenderContext> {
        let mut context = RenderContext {
            path: request.path().to_string(),
            url: request.uri.clone(),
            query: parse_query(request.query_string().unwrap_or_default()),
            headers: self.safe_headers(request),
            locale: String::new(),
            extensions: Extensions::new(),
        };
        context.locale = context
            .headers
            .get("accept-language")
            .and_then(|value| preferred_locale(value))
            .unwrap_or_else(|| self.default_locale.clone());

        for enricher in &self.enrichers {
            let fields = enricher.enrich(request, &context).map_err(|e| {
                TrellisError::ContextEnrichment {
                    enricher: enricher.name().to_string(),
                    message: format!("{e:#}"),
                }
            })?;
            context.extensions.extend(fields);
        }

        Ok(context)
    }

    fn safe_headers(&self, request: &RawRequest) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        for (name, value) in &request.headers {
            let name = name.to_ascii_lowercase();
            if self.allowlist.iter().any(|allowed| *allowed == name) {
                headers.entry(name).or_insert_with(|| value.clone());
            }
        }
        headers
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// First language tag of an `accept-language` header, ignoring weights
fn preferred_locale(header: &str) -> Option<String> {
    header
        .split(',')
        .map(|part| part.split(';').next().unwrap_or_default().trim())
        .find(|tag| !tag.is_empty() && *tag != "*")
        .map(|tag| tag.to_string())
}
