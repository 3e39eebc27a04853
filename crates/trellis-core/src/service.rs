//! Request orchestration
//!
//! [`Trellis`] ties the pieces together for one request: resolve the chain
//! for the bound view, build the render context, decide between a full
//! document and a segment from the client's mounted chain, and render.
//! Chain resolution happens first so an unknown view never reaches a
//! component.

use crate::component::Props;
use crate::context::{RawRequest, RenderContextBuilder};
use crate::handle::RegistryHandle;
use crate::navigation::{parse_mounted_chain, render_segment, NavigationPlan, NavigationResponse};
use crate::pipeline::{RenderMode, RenderPipeline, StreamFailureHook};
use crate::reporter::{ErrorReporter, RequestMeta, TracingReporter};
use crate::{Result, TrellisError};
use std::sync::Arc;
use trellis_config::{NavigationConfig, TrellisConfig};

/// Rendering service shared by every request
#[derive(Clone)]
pub struct Trellis {
    registry: Arc<RegistryHandle>,
    contexts: RenderContextBuilder,
    pipeline: RenderPipeline,
    navigation: NavigationConfig,
    mode: RenderMode,
    reporter: Arc<dyn ErrorReporter>,
}

impl Trellis {
    /// Service over a registry, configured from `config`
    pub fn new(registry: Arc<RegistryHandle>, config: &TrellisConfig) -> Self {
        Self {
            registry,
            contexts: RenderContextBuilder::from_config(&config.context),
            pipeline: RenderPipeline::new(&config.render),
            navigation: config.navigation.clone(),
            mode: config.render.mode.into(),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the context builder, e.g. to add enrichers
    pub fn with_context_builder(mut self, contexts: RenderContextBuilder) -> Self {
        self.contexts = contexts;
        self
    }

    /// Replace the error reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Override the configured render mode
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// The reloadable registry
    pub fn registry(&self) -> &Arc<RegistryHandle> {
        &self.registry
    }

    /// Navigation header settings
    pub fn navigation(&self) -> &NavigationConfig {
        &self.navigation
    }

    /// The render pipeline
    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Mounted chain reported by the client, if any
    ///
    /// A present but unreadable header is logged and treated as absent.
    pub fn mounted_chain(&self, request: &RawRequest) -> Option<Vec<String>> {
        let raw = request.header_value(&self.navigation.mounted_header)?;
        let chain = parse_mounted_chain(raw);
        if chain.is_none() {
            tracing::warn!(
                header = %self.navigation.mounted_header,
                value = %raw,
                "Ignoring malformed mounted chain header"
            );
        }
        chain
    }

    /// Request details for reporting failures of a request bound to `view_path`
    pub fn request_meta(&self, view_path: &str, request: &RawRequest) -> RequestMeta {
        RequestMeta {
            method: request.method.clone(),
            uri: request.uri.clone(),
            view: view_path.to_string(),
            segment: request.header_value(&self.navigation.mounted_header).is_some(),
        }
    }

    /// Hand a failure to the configured reporter
    ///
    /// For failures the host hits around [`Trellis::handle`], such as its
    /// own handler erroring or producing unserializable props.
    pub fn report(&self, error: &TrellisError, meta: &RequestMeta) {
        self.reporter.report(error, meta);
    }

    /// Serve one request bound to the view at `view_path`
    ///
    /// `props` is the handler output for the page. Failures are reported
    /// before being returned. Streaming mode must run inside a Tokio
    /// runtime; a stream that fails after output started is reported when
    /// it stops.
    pub fn handle(&self, view_path: &str, props: Props, request: &RawRequest) -> Result<NavigationResponse> {
        let mounted = if self.navigation.segments_enabled {
            self.mounted_chain(request)
        } else {
            None
        };

        let meta = self.request_meta(view_path, request);
        let result = self.respond(view_path, props, request, mounted.as_deref(), &meta);
        if let Err(err) = &result {
            self.report(err, &meta);
        }
        result
    }

    fn respond(
        &self,
        view_path: &str,
        props: Props,
        request: &RawRequest,
        mounted: Option<&[String]>,
        meta: &RequestMeta,
    ) -> Result<NavigationResponse> {
        let resolver = self.registry.resolver();
        let chain = resolver.resolve_chain(view_path)?;
        let context = self.contexts.build(request)?;

        match NavigationPlan::for_chains(mounted, &chain) {
            NavigationPlan::Full => {
                tracing::debug!(view = %view_path, mode = ?self.mode, "Full render");
                let reporter = self.reporter.clone();
                let meta = meta.clone();
                let on_stream_failure: StreamFailureHook =
                    Box::new(move |err: &TrellisError| reporter.report(err, &meta));
                self.pipeline
                    .render(chain, props, Arc::new(context), self.mode, Some(on_stream_failure))
                    .map(NavigationResponse::Full)
            }
            NavigationPlan::Segment {
                divergence,
                swap_point,
            } => {
                tracing::debug!(
                    view = %view_path,
                    divergence,
                    swap_point = %swap_point,
                    "Segment render"
                );
                render_segment(&self.pipeline, &chain, divergence, swap_point, props, &context)
                    .map(NavigationResponse::Segment)
            }
        }
    }
}

impl std::fmt::Debug for Trellis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trellis")
            .field("navigation", &self.navigation)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
