//! The renderer capability consumed by the pipeline
//!
//! Trellis does not render markup itself. Hosts plug in whatever produces
//! HTML for a component (templates, a virtual DOM, hand-written strings) by
//! implementing [`Component`]. Layout components mark where their child goes
//! with [`SLOT`]; page components render a complete fragment.

use crate::context::RenderContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Opaque, JSON-shaped props passed to components
pub type Props = serde_json::Value;

/// Placeholder a layout emits exactly once where its child is rendered
pub const SLOT: &str = "<!--trellis:slot-->";

/// A component failed to render
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ComponentError(pub String);

impl ComponentError {
    /// Create a component error from any message
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Something that turns props and a render context into markup
///
/// Layouts receive their resolved configuration as props and must include
/// [`SLOT`] exactly once. Pages receive the props returned by the request
/// handler.
pub trait Component: Send + Sync {
    /// Render to an HTML fragment
    fn render(&self, props: &Props, context: &RenderContext) -> Result<String, ComponentError>;
}

impl<F> Component for F
where
    F: Fn(&Props, &RenderContext) -> Result<String, ComponentError> + Send + Sync,
{
    fn render(&self, props: &Props, context: &RenderContext) -> Result<String, ComponentError> {
        self(props, context)
    }
}

/// Shared handle to a component
pub type ComponentRef = Arc<dyn Component>;

/// Layout used when no layout is declared at the root scope
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Component for PassThrough {
    fn render(&self, _props: &Props, _context: &RenderContext) -> Result<String, ComponentError> {
        Ok(SLOT.to_string())
    }
}

/// Component exports available to a registry manifest, by export name
///
/// The build step writes export names into the manifest; the host binary
/// links the actual components and registers them here.
#[derive(Clone, Default)]
pub struct ComponentCatalog {
    exports: HashMap<String, ComponentRef>,
}

impl ComponentCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under an export name (builder pattern)
    pub fn with(mut self, export: impl Into<String>, component: impl Component + 'static) -> Self {
        self.insert(export, Arc::new(component));
        self
    }

    /// Register a shared component under an export name
    pub fn insert(&mut self, export: impl Into<String>, component: ComponentRef) {
        self.exports.insert(export.into(), component);
    }

    /// Look up an export
    pub fn get(&self, export: &str) -> Option<ComponentRef> {
        self.exports.get(export).cloned()
    }

    /// Number of exports
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl fmt::Debug for ComponentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.exports.keys().collect();
        names.sort();
        f.debug_struct("ComponentCatalog")
            .field("exports", &names)
            .finish()
    }
}
