//! Layout declarations and the immutable registry snapshot

use crate::component::{ComponentRef, PassThrough};
use crate::registry::{validate_logical_path, ViewRegistry};
use crate::{Result, TrellisError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Static layout configuration
pub type LayoutConfig = serde_json::Map<String, serde_json::Value>;

/// Identifier of the built-in root layout used when none is declared at `/`
pub const IMPLICIT_ROOT_ID: &str = "root";

/// A layout definition: wraps every view whose path lies under `scope`
#[derive(Clone)]
pub struct LayoutDescriptor {
    /// Globally unique identifier
    pub id: String,
    /// Logical path prefix this layout wraps (`/` for the root layout)
    pub scope: String,
    /// Component that renders the layout around its slot
    pub component: ComponentRef,
    /// Static configuration declared with the layout
    pub config: LayoutConfig,
}

impl LayoutDescriptor {
    /// Declare a layout
    pub fn new(id: impl Into<String>, scope: impl Into<String>, component: ComponentRef) -> Self {
        Self {
            id: id.into(),
            scope: scope.into(),
            component,
            config: LayoutConfig::new(),
        }
    }

    /// Attach static configuration (builder pattern)
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    fn implicit_root() -> Self {
        Self::new(IMPLICIT_ROOT_ID, "/", Arc::new(PassThrough))
    }
}

impl fmt::Debug for LayoutDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutDescriptor")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("config", &self.config)
            .finish()
    }
}

/// Immutable set of layouts, indexed by identifier and by scope
#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    by_id: HashMap<String, Arc<LayoutDescriptor>>,
    by_scope: HashMap<String, Arc<LayoutDescriptor>>,
}

impl LayoutRegistry {
    /// Build from declarations
    ///
    /// Identifiers and scopes must be unique. A root layout is added when
    /// none is declared at `/`.
    pub fn new(layouts: impl IntoIterator<Item = LayoutDescriptor>) -> Result<Self> {
        let mut by_id: HashMap<String, Arc<LayoutDescriptor>> = HashMap::new();
        let mut by_scope: HashMap<String, Arc<LayoutDescriptor>> = HashMap::new();

        for layout in layouts {
            validate_logical_path(&layout.scope)?;
            if layout.id.trim().is_empty() {
                return Err(TrellisError::InvalidPath {
                    path: layout.scope.clone(),
                    reason: "layout identifier is empty".to_string(),
                });
            }
            if by_id.contains_key(&layout.id) {
                return Err(TrellisError::DuplicateLayout { id: layout.id });
            }
            if let Some(existing) = by_scope.get(&layout.scope) {
                return Err(TrellisError::LayoutScopeConflict {
                    scope: layout.scope.clone(),
                    first: existing.id.clone(),
                    second: layout.id,
                });
            }
            let layout = Arc::new(layout);
            by_id.insert(layout.id.clone(), layout.clone());
            by_scope.insert(layout.scope.clone(), layout);
        }

        if !by_scope.contains_key("/") {
            let root = Arc::new(LayoutDescriptor::implicit_root());
            if by_id.contains_key(&root.id) {
                return Err(TrellisError::DuplicateLayout { id: root.id.clone() });
            }
            by_id.insert(root.id.clone(), root.clone());
            by_scope.insert(root.scope.clone(), root);
        }

        Ok(Self { by_id, by_scope })
    }

    /// Layout with this identifier
    pub fn get(&self, id: &str) -> Option<&Arc<LayoutDescriptor>> {
        self.by_id.get(id)
    }

    /// Declared identifiers, including the implicit root when one was added
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Layout declared at exactly this scope
    pub fn at_scope(&self, scope: &str) -> Option<&Arc<LayoutDescriptor>> {
        self.by_scope.get(scope)
    }
}

/// Everything the resolver reads: views, layouts and per-route overrides
///
/// A snapshot is a pure value; reload by building a new one.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    views: ViewRegistry,
    layouts: LayoutRegistry,
    overrides: HashMap<String, LayoutConfig>,
}

impl RegistrySnapshot {
    /// Combine views and layouts, rejecting identifier collisions
    pub fn new(views: ViewRegistry, layouts: LayoutRegistry) -> Result<Self> {
        for id in layouts.ids() {
            if views.contains(id) {
                return Err(TrellisError::IdentifierCollision { id: id.to_string() });
            }
        }
        Ok(Self {
            views,
            layouts,
            overrides: HashMap::new(),
        })
    }

    /// Attach per-route configuration overrides keyed by view path
    pub fn with_overrides(mut self, overrides: HashMap<String, LayoutConfig>) -> Result<Self> {
        for path in overrides.keys() {
            self.views.resolve(path)?;
        }
        self.overrides = overrides;
        Ok(self)
    }

    /// The view registry
    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    /// The layout registry
    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    /// Override configuration for a view path, if any
    pub fn route_override(&self, path: &str) -> Option<&LayoutConfig> {
        self.overrides.get(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::PassThrough;

    fn layout(id: &str, scope: &str) -> LayoutDescriptor {
        LayoutDescriptor::new(id, scope, Arc::new(PassThrough))
    }

    #[test]
    fn implicit_root_is_added() {
        let layouts = LayoutRegistry::new(vec![layout("Admin", "/admin")]).unwrap();
        assert_eq!(layouts.at_scope("/").unwrap().id, IMPLICIT_ROOT_ID);
        assert_eq!(layouts.len(), 2);

        let mut ids: Vec<&str> = layouts.ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["Admin", IMPLICIT_ROOT_ID]);
        assert!(layouts.get("Admin").is_some());
    }

    #[test]
    fn declared_root_replaces_implicit_root() {
        let layouts = LayoutRegistry::new(vec![layout("Root", "/")]).unwrap();
        assert_eq!(layouts.at_scope("/").unwrap().id, "Root");
        assert!(layouts.get(IMPLICIT_ROOT_ID).is_none());
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let result = LayoutRegistry::new(vec![layout("Admin", "/admin"), layout("Admin", "/ops")]);
        assert!(matches!(result, Err(TrellisError::DuplicateLayout { .. })));
    }

    #[test]
    fn shared_scope_is_rejected() {
        let result = LayoutRegistry::new(vec![layout("A", "/admin"), layout("B", "/admin")]);
        assert!(matches!(
            result,
            Err(TrellisError::LayoutScopeConflict { ref first, ref second, .. }) if first == "A" && second == "B"
        ));
    }

    #[test]
    fn layout_and_view_identifiers_must_not_collide() {
        let views = ViewRegistry::builder()
            .register("/admin", Arc::new(PassThrough))
            .build()
            .unwrap();
        let layouts = LayoutRegistry::new(vec![layout("/admin", "/admin")]).unwrap();
        let result = RegistrySnapshot::new(views, layouts);
        assert!(matches!(result, Err(TrellisError::IdentifierCollision { ref id }) if id == "/admin"));
    }

    #[test]
    fn overrides_must_target_registered_views() {
        let views = ViewRegistry::builder().build().unwrap();
        let layouts = LayoutRegistry::new(Vec::new()).unwrap();
        let mut overrides = HashMap::new();
        overrides.insert("/ghost".to_string(), LayoutConfig::new());

        let result = RegistrySnapshot::new(views, layouts)
            .unwrap()
            .with_overrides(overrides);
        assert!(matches!(result, Err(TrellisError::ViewNotFound { .. })));
    }
}
