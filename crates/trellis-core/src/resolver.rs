//! Layout chain resolution
//!
//! For a logical view path the resolver walks the path's segments from the
//! root, picks up the layout declared at each ancestor scope (including the
//! path itself), and terminates the chain with the view. Configuration is
//! merged shallowly down the chain: for a key declared at several levels
//! the deepest declaration wins, and nested objects are replaced, never
//! merged.
//!
//! Resolution is a pure function of the path and the registry snapshot, so
//! results are cached per path. Two concurrent first requests for the same
//! path may both compute the chain; they produce identical values and the
//! first insert wins.

use crate::component::Props;
use crate::layout::{LayoutConfig, LayoutDescriptor, RegistrySnapshot};
use crate::registry::ViewEntry;
use crate::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// A layout at a specific position in a chain
#[derive(Debug, Clone)]
pub struct ResolvedLayout {
    /// The layout declaration
    pub descriptor: Arc<LayoutDescriptor>,
    /// Ordinal from the root (root = 0)
    pub position: usize,
    /// Configuration merged from the root down to and including this layout
    pub config: LayoutConfig,
}

impl ResolvedLayout {
    /// Layout identifier
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Props handed to the layout component and to client hydration
    pub fn props(&self) -> Props {
        Props::Object(self.config.clone())
    }
}

/// Ordered root-to-leaf layouts terminated by exactly one view
#[derive(Debug, Clone)]
pub struct LayoutChain {
    layouts: Vec<ResolvedLayout>,
    view: Arc<ViewEntry>,
    config: LayoutConfig,
}

impl LayoutChain {
    /// Layouts from root to leaf; never empty
    pub fn layouts(&self) -> &[ResolvedLayout] {
        &self.layouts
    }

    /// The leaf view
    pub fn view(&self) -> &Arc<ViewEntry> {
        &self.view
    }

    /// Logical path of the leaf view
    pub fn view_path(&self) -> &str {
        &self.view.path
    }

    /// Fully merged configuration, including per-route overrides
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Identifiers of every chain element: layout ids followed by the view
    /// path. This is what clients report as their mounted chain.
    pub fn identifiers(&self) -> Vec<String> {
        self.layouts
            .iter()
            .map(|l| l.descriptor.id.clone())
            .chain(std::iter::once(self.view.path.clone()))
            .collect()
    }

    /// Number of chain elements including the view
    pub fn len(&self) -> usize {
        self.layouts.len() + 1
    }

    /// Chains always contain at least the root layout and the view
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Resolves and caches layout chains against one registry snapshot
#[derive(Debug)]
pub struct LayoutResolver {
    snapshot: Arc<RegistrySnapshot>,
    cache: DashMap<String, Arc<LayoutChain>>,
}

impl LayoutResolver {
    /// Create a resolver with an empty cache
    pub fn new(snapshot: Arc<RegistrySnapshot>) -> Self {
        Self {
            snapshot,
            cache: DashMap::new(),
        }
    }

    /// The snapshot this resolver reads
    pub fn snapshot(&self) -> &Arc<RegistrySnapshot> {
        &self.snapshot
    }

    /// Resolve the chain for a logical view path
    ///
    /// Fails with `ViewNotFound` when no view is registered at `path`;
    /// failures are not cached.
    pub fn resolve_chain(&self, path: &str) -> Result<Arc<LayoutChain>> {
        if let Some(chain) = self.cache.get(path) {
            tracing::debug!(path, "Layout chain cache hit");
            return Ok(chain.clone());
        }

        let chain = Arc::new(self.compute(path)?);
        tracing::debug!(path, depth = chain.len(), "Resolved layout chain");
        let cached = self
            .cache
            .entry(path.to_string())
            .or_insert(chain)
            .clone();
        Ok(cached)
    }

    /// Number of cached chains
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, path: &str) -> Result<LayoutChain> {
        let view = self.snapshot.views().resolve(path)?;
        let layouts = self.snapshot.layouts();

        let mut resolved = Vec::new();
        let mut merged = LayoutConfig::new();
        for scope in ancestor_scopes(path) {
            if let Some(layout) = layouts.at_scope(&scope) {
                merge_shallow(&mut merged, &layout.config);
                resolved.push(ResolvedLayout {
                    descriptor: layout.clone(),
                    position: resolved.len(),
                    config: merged.clone(),
                });
            }
        }

        if let Some(overrides) = self.snapshot.route_override(path) {
            merge_shallow(&mut merged, overrides);
        }

        Ok(LayoutChain {
            layouts: resolved,
            view,
            config: merged,
        })
    }
}

/// Scopes from `/` down to the path itself: `/a/b` → `/`, `/a`, `/a/b`
pub fn ancestor_scopes(path: &str) -> Vec<String> {
    let mut scopes = vec!["/".to_string()];
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current.push('/');
        current.push_str(segment);
        scopes.push(current.clone());
    }
    scopes
}

/// Overlay `deeper` onto `base`; keys in `deeper` replace whole values
pub fn merge_shallow(base: &mut LayoutConfig, deeper: &LayoutConfig) {
    for (key, value) in deeper {
        base.insert(key.clone(), value.clone());
    }
}
