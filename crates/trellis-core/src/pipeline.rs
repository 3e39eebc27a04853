//! Render pipeline: compose a layout chain and its page into markup
//!
//! Layouts wrap each other root-to-leaf and the innermost wraps the page.
//! Each layout's output is split at its [`SLOT`] placeholder; the child is
//! rendered between the two halves inside a slot container (see
//! [`crate::markup`]).
//!
//! Two modes produce the same bytes:
//!
//! - **String**: the whole document is built before returning.
//! - **Streaming**: chunks are flushed at layout boundaries through a
//!   bounded channel. The hydration data block is the last chunk, after
//!   every element it describes. If the consumer goes away the producer
//!   stops at the next chunk. A component fault after output has started
//!   produces an error marker chunk and ends the stream.

use crate::component::{Props, SLOT};
use crate::context::RenderContext;
use crate::markup::{escape_attr, slot_close, slot_open, ROOT_TAG};
use crate::payload::HydrationPayload;
use crate::resolver::{LayoutChain, ResolvedLayout};
use crate::{Result, TrellisError};
use futures::Stream;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use trellis_config::{RenderConfig, RenderModeConfig};

/// How a full document is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One complete string
    #[default]
    String,
    /// Chunks flushed at layout boundaries
    Streaming,
}

impl From<RenderModeConfig> for RenderMode {
    fn from(mode: RenderModeConfig) -> Self {
        match mode {
            RenderModeConfig::String => Self::String,
            RenderModeConfig::Streaming => Self::Streaming,
        }
    }
}

/// Result of a full render
pub enum RenderedOutput {
    /// Complete document
    Document(String),
    /// Document produced incrementally
    Stream(RenderStream),
}

impl std::fmt::Debug for RenderedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document(doc) => f.debug_tuple("Document").field(&doc.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Markup chunks of a streaming render
pub struct RenderStream {
    inner: ReceiverStream<String>,
}

impl Stream for RenderStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Called once with the error that ended a stream after output started
pub type StreamFailureHook = Box<dyn FnOnce(&TrellisError) + Send>;

/// Rendered suffix of a chain, ready to graft below a swap point
#[derive(Debug, Clone)]
pub struct Segment {
    /// Markup for the layouts below the swap point and the page
    pub markup: String,
    /// Hydration data for exactly those layouts and the page
    pub payload: HydrationPayload,
}

/// Static parts of the HTML document around the composed chain
#[derive(Debug, Clone)]
pub struct DocumentShell {
    title: String,
    lang: String,
    stylesheets: Vec<String>,
    client_entry: Option<String>,
    data_script_id: String,
}

impl DocumentShell {
    /// Shell described by render configuration
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            title: config.title.clone(),
            lang: config.lang.clone(),
            stylesheets: config.stylesheets.clone(),
            client_entry: config.client_entry.clone(),
            data_script_id: config.data_script_id.clone(),
        }
    }

    /// Id of the inline hydration data block
    pub fn data_script_id(&self) -> &str {
        &self.data_script_id
    }

    /// Everything up to and including the opening root element
    fn head(&self, chain: &LayoutChain) -> String {
        let title = chain
            .config()
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or(&self.title);

        let mut head = format!(
            "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"utf-8\"><title>{}</title>",
            escape_attr(&self.lang),
            escape_attr(title)
        );
        for href in &self.stylesheets {
            head.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">",
                escape_attr(href)
            ));
        }
        head.push_str(&format!("</head><body><{ROOT_TAG}>"));
        head
    }

    /// Closing root element, hydration data, client entry and end of document
    fn tail(&self, payload_json: &str) -> String {
        let mut tail = format!(
            "</{ROOT_TAG}><script type=\"application/json\" id=\"{}\">{}</script>",
            escape_attr(&self.data_script_id),
            payload_json
        );
        if let Some(entry) = &self.client_entry {
            tail.push_str(&format!(
                "<script type=\"module\" src=\"{}\"></script>",
                escape_attr(entry)
            ));
        }
        tail.push_str("</body></html>");
        tail
    }
}

/// Marker chunk emitted when a streaming render fails mid-flight
pub fn error_marker(identifier: &str) -> String {
    format!(
        "<template data-trellis-error=\"{}\"></template>",
        escape_attr(identifier)
    )
}

/// Composes chains into documents and segments
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    shell: DocumentShell,
    stream_buffer: usize,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl RenderPipeline {
    /// Pipeline configured from render settings
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            shell: DocumentShell::from_config(config),
            stream_buffer: config.stream_buffer.max(1),
        }
    }

    /// The document shell
    pub fn shell(&self) -> &DocumentShell {
        &self.shell
    }

    /// Render a full document in the requested mode
    ///
    /// Streaming mode must be called from within a Tokio runtime; failures
    /// after the first chunk go to `on_stream_failure`.
    pub fn render(
        &self,
        chain: Arc<LayoutChain>,
        props: Props,
        context: Arc<RenderContext>,
        mode: RenderMode,
        on_stream_failure: Option<StreamFailureHook>,
    ) -> Result<RenderedOutput> {
        match mode {
            RenderMode::String => self
                .render_to_string(&chain, props, &context)
                .map(RenderedOutput::Document),
            RenderMode::Streaming => self
                .render_stream(chain, props, context, on_stream_failure)
                .map(RenderedOutput::Stream),
        }
    }

    /// Render a complete document synchronously
    pub fn render_to_string(
        &self,
        chain: &LayoutChain,
        props: Props,
        context: &RenderContext,
    ) -> Result<String> {
        let payload = HydrationPayload::for_chain(chain, 0, props, context);
        let payload_json = payload.to_inline_json()?;
        let body = compose(chain, 0, &payload.props, context)?;

        let mut document = self.shell.head(chain);
        document.push_str(&body);
        document.push_str(&self.shell.tail(&payload_json));
        Ok(document)
    }

    /// Render only the layouts from position `from` down, plus the page
    pub fn render_segment(
        &self,
        chain: &LayoutChain,
        from: usize,
        props: Props,
        context: &RenderContext,
    ) -> Result<Segment> {
        let payload = HydrationPayload::for_chain(chain, from, props, context);
        // fail on unserializable data before doing any rendering work
        payload.to_inline_json()?;
        let markup = compose(chain, from, &payload.props, context)?;
        Ok(Segment { markup, payload })
    }

    /// Render a complete document as a stream of chunks
    ///
    /// Serialization problems are returned here, before any output exists.
    /// Component faults later in the stream become an error marker chunk
    /// and are handed to `on_failure`.
    pub fn render_stream(
        &self,
        chain: Arc<LayoutChain>,
        props: Props,
        context: Arc<RenderContext>,
        on_failure: Option<StreamFailureHook>,
    ) -> Result<RenderStream> {
        let payload = HydrationPayload::for_chain(&chain, 0, props, &context);
        let payload_json = payload.to_inline_json()?;
        let head = self.shell.head(&chain);
        let tail = self.shell.tail(&payload_json);

        let (tx, rx) = mpsc::channel(self.stream_buffer);
        tokio::task::spawn_blocking(move || {
            let view = chain.view_path().to_string();
            let mut sink = ChunkSink { tx };
            match produce_stream(&mut sink, &chain, &payload.props, &context, head, tail) {
                Ok(()) => tracing::debug!(view = %view, "Streaming render complete"),
                Err(StreamStop::Disconnected) => {
                    tracing::debug!(view = %view, "Client disconnected, streaming render stopped")
                }
                Err(StreamStop::Failed(err)) => {
                    tracing::warn!(view = %view, error = %err, "Streaming render failed after output started");
                    let identifier = match &err {
                        TrellisError::Render { identifier, .. } => identifier.clone(),
                        _ => view.clone(),
                    };
                    let _ = sink.send(error_marker(&identifier));
                    if let Some(hook) = on_failure {
                        hook(&err);
                    }
                }
            }
        });

        Ok(RenderStream {
            inner: ReceiverStream::new(rx),
        })
    }
}

struct ChunkSink {
    tx: mpsc::Sender<String>,
}

impl ChunkSink {
    fn send(&mut self, chunk: String) -> std::result::Result<(), StreamStop> {
        self.tx
            .blocking_send(chunk)
            .map_err(|_| StreamStop::Disconnected)
    }
}

enum StreamStop {
    Disconnected,
    Failed(TrellisError),
}

fn produce_stream(
    sink: &mut ChunkSink,
    chain: &LayoutChain,
    props: &Props,
    context: &RenderContext,
    head: String,
    tail: String,
) -> std::result::Result<(), StreamStop> {
    sink.send(head)?;

    let mut closers = Vec::with_capacity(chain.layouts().len());
    for layout in chain.layouts() {
        let (before, after) = guarded(layout.id(), || split_layout(layout, context))
            .map_err(StreamStop::Failed)?;
        sink.send(format!("{before}{}", slot_open(layout.id())))?;
        closers.push(after);
    }

    let page = guarded(chain.view_path(), || render_page(chain, props, context))
        .map_err(StreamStop::Failed)?;
    sink.send(page)?;

    for after in closers.into_iter().rev() {
        sink.send(format!("{}{after}", slot_close()))?;
    }

    sink.send(tail)
}

/// Compose layouts from `from` down plus the page into one string
///
/// One fault boundary covers the whole composition; a panic inside any
/// component is reported against the element that was rendering.
fn compose(chain: &LayoutChain, from: usize, props: &Props, context: &RenderContext) -> Result<String> {
    let current = Cell::new(from);
    let layouts = chain.layouts().get(from..).unwrap_or_default();

    let result = catch_unwind(AssertUnwindSafe(|| -> Result<String> {
        let mut out = String::new();
        let mut closers = Vec::with_capacity(layouts.len());
        for (offset, layout) in layouts.iter().enumerate() {
            current.set(from + offset);
            let (before, after) = split_layout(layout, context)?;
            out.push_str(&before);
            out.push_str(&slot_open(layout.id()));
            closers.push(after);
        }

        current.set(chain.layouts().len());
        out.push_str(&render_page(chain, props, context)?);

        for after in closers.into_iter().rev() {
            out.push_str(&slot_close());
            out.push_str(&after);
        }
        Ok(out)
    }));

    result.unwrap_or_else(|panic| {
        let identifier = chain
            .layouts()
            .get(current.get())
            .map(|l| l.id().to_string())
            .unwrap_or_else(|| chain.view_path().to_string());
        Err(TrellisError::render(identifier, panic_message(&panic)))
    })
}

fn guarded<T>(identifier: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|panic| Err(TrellisError::render(identifier, panic_message(&panic))))
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

fn split_layout(layout: &ResolvedLayout, context: &RenderContext) -> Result<(String, String)> {
    let html = layout
        .descriptor
        .component
        .render(&layout.props(), context)
        .map_err(|e| TrellisError::render(layout.id(), e.to_string()))?;

    let (before, after) = html
        .split_once(SLOT)
        .ok_or_else(|| TrellisError::render(layout.id(), "layout did not render a slot"))?;
    if after.contains(SLOT) {
        return Err(TrellisError::render(layout.id(), "layout rendered more than one slot"));
    }
    Ok((before.to_string(), after.to_string()))
}

fn render_page(chain: &LayoutChain, props: &Props, context: &RenderContext) -> Result<String> {
    chain
        .view()
        .component
        .render(props, context)
        .map_err(|e| TrellisError::render(chain.view_path(), e.to_string()))
}
