//! View registry: logical view path → component
//!
//! Views are registered through [`ViewRegistryBuilder`] and the result is
//! read-only. A miss on [`ViewRegistry::resolve`] is `ViewNotFound`. To
//! change the set of views, build a new snapshot and swap it in through
//! [`crate::RegistryHandle`].

use crate::component::ComponentRef;
use crate::{Result, TrellisError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A leaf page registered under a logical view path
#[derive(Clone)]
pub struct ViewEntry {
    /// Slash-delimited logical path, e.g. `/admin/users/[id]`
    pub path: String,
    /// Component that renders the page
    pub component: ComponentRef,
}

impl fmt::Debug for ViewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEntry").field("path", &self.path).finish()
    }
}

/// Immutable mapping from logical view path to [`ViewEntry`]
///
/// Lookup is exact-match only. Wildcards and prefixes are a routing
/// concern and never reach this layer.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<String, Arc<ViewEntry>>,
}

impl ViewRegistry {
    /// Start building a registry
    pub fn builder() -> ViewRegistryBuilder {
        ViewRegistryBuilder::default()
    }

    /// Resolve a logical path to its view
    pub fn resolve(&self, path: &str) -> Result<Arc<ViewEntry>> {
        self.get(path)
            .cloned()
            .ok_or_else(|| TrellisError::ViewNotFound {
                path: path.to_string(),
            })
    }

    /// View registered at exactly this path
    pub fn get(&self, path: &str) -> Option<&Arc<ViewEntry>> {
        self.views.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.views.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Registered paths in sorted order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.views.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

/// Accumulates view registrations
///
/// Errors are collected and reported from [`ViewRegistryBuilder::build`]
/// so registration code can stay a flat list of calls.
#[derive(Default)]
pub struct ViewRegistryBuilder {
    views: HashMap<String, Arc<ViewEntry>>,
    error: Option<TrellisError>,
}

impl ViewRegistryBuilder {
    /// Register a view (builder pattern)
    pub fn register(mut self, path: impl Into<String>, component: ComponentRef) -> Self {
        if self.error.is_some() {
            return self;
        }
        let path = path.into();
        if let Err(e) = validate_logical_path(&path) {
            self.error = Some(e);
            return self;
        }
        if self.views.contains_key(&path) {
            self.error = Some(TrellisError::DuplicateView { path });
            return self;
        }
        let entry = Arc::new(ViewEntry {
            path: path.clone(),
            component,
        });
        self.views.insert(path, entry);
        self
    }

    /// Finish building; fails on the first invalid or duplicate path
    pub fn build(self) -> Result<ViewRegistry> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(ViewRegistry { views: self.views }),
        }
    }
}

/// Check that a logical path is absolute, slash-delimited and has no empty
/// or relative segments
pub fn validate_logical_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| TrellisError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if path.len() > 1 && path.ends_with('/') {
        return Err(invalid("must not end with '/'"));
    }
    if path.len() > 1 {
        for segment in path[1..].split('/') {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if segment == "." || segment == ".." {
                return Err(invalid("relative segment"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::PassThrough;

    fn component() -> ComponentRef {
        Arc::new(PassThrough)
    }

    #[test]
    fn resolve_is_exact_match() {
        let registry = ViewRegistry::builder()
            .register("/users", component())
            .register("/users/[id]", component())
            .build()
            .unwrap();

        assert!(registry.resolve("/users").is_ok());
        assert!(registry.resolve("/users/[id]").is_ok());
        assert!(registry.resolve("/users/1").is_err());
        assert!(registry.resolve("/use").is_err());
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("/users"));
    }

    #[test]
    fn unregistered_path_is_view_not_found() {
        let registry = ViewRegistry::builder().build().unwrap();
        let err = registry.resolve("/does-not-exist").unwrap_err();
        assert!(matches!(err, TrellisError::ViewNotFound { ref path } if path == "/does-not-exist"));
    }

    #[test]
    fn duplicate_registration_fails_build() {
        let result = ViewRegistry::builder()
            .register("/home", component())
            .register("/home", component())
            .build();
        assert!(matches!(result, Err(TrellisError::DuplicateView { .. })));
    }

    #[test]
    fn invalid_paths_fail_build() {
        for path in ["home", "/home/", "/a//b", "/a/../b"] {
            let result = ViewRegistry::builder().register(path, component()).build();
            assert!(
                matches!(result, Err(TrellisError::InvalidPath { .. })),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn paths_are_sorted() {
        let registry = ViewRegistry::builder()
            .register("/b", component())
            .register("/a", component())
            .build()
            .unwrap();
        assert_eq!(registry.paths(), vec!["/a", "/b"]);
    }
}
