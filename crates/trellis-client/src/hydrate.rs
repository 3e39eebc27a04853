//! Client component registry and hydration matching

use crate::{ClientError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use trellis_core::markup::{slot_ids, slot_range};
use trellis_core::{ClientContext, HydrationPayload, Props};

/// One element to attach interactivity to
#[derive(Debug, Clone, Copy)]
pub struct HydrationTarget<'a> {
    /// Layout id or view path
    pub id: &'a str,
    pub props: &'a Props,
    pub context: &'a ClientContext,
    /// Markup the element rendered into (its parent's slot contents)
    pub markup: &'a str,
}

/// Attaches interactivity to server-rendered markup
pub trait Hydrate: Send + Sync {
    fn hydrate(&self, target: &HydrationTarget<'_>) -> std::result::Result<(), String>;
}

impl<F> Hydrate for F
where
    F: Fn(&HydrationTarget<'_>) -> std::result::Result<(), String> + Send + Sync,
{
    fn hydrate(&self, target: &HydrationTarget<'_>) -> std::result::Result<(), String> {
        self(target)
    }
}

/// No-op hydration for static elements
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl Hydrate for Inert {
    fn hydrate(&self, _target: &HydrationTarget<'_>) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Client-side components by identifier
#[derive(Clone, Default)]
pub struct ClientRegistry {
    components: HashMap<String, Arc<dyn Hydrate>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under a layout id or view path (builder pattern)
    pub fn with(mut self, id: impl Into<String>, component: impl Hydrate + 'static) -> Self {
        self.components.insert(id.into(), Arc::new(component));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Fail on the first identifier without a client component
    pub fn ensure_registered<S: AsRef<str>>(&self, ids: &[S]) -> Result<()> {
        match ids.iter().find(|id| !self.contains(id.as_ref())) {
            Some(missing) => Err(ClientError::ComponentNotRegistered {
                id: missing.as_ref().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Check that `region` can be hydrated from `payload` without touching it
    ///
    /// Every identifier must be registered and the slot containers in
    /// `region` must match the payload's layouts one for one. Run before
    /// mounting so a bad response never reaches the document.
    pub fn check(&self, region: &str, payload: &HydrationPayload) -> Result<()> {
        self.ensure_registered(&payload.identifiers())?;

        let expected: Vec<&str> = payload.layout_chain.iter().map(|l| l.id.as_str()).collect();
        let found = slot_ids(region);
        if found != expected {
            let at = expected
                .iter()
                .zip(&found)
                .find(|&(e, f)| *e != f.as_str())
                .map(|(e, _)| e.to_string())
                .unwrap_or_else(|| payload.target_view_path.clone());
            return Err(ClientError::HydrationMismatch {
                id: at,
                reason: format!("expected slots {expected:?}, found {found:?}"),
            });
        }
        Ok(())
    }

    /// Hydrate the elements a payload describes inside `region`
    ///
    /// `region` is the markup that was just mounted: the swap point's slot
    /// contents for a segment, the root contents for a full document.
    /// Returns the hydrated identifiers, outermost first.
    pub fn hydrate(&self, region: &str, payload: &HydrationPayload) -> Result<Vec<String>> {
        self.check(region, payload)?;
        let ids = payload.identifiers();

        let mut parent = region;
        for layout in &payload.layout_chain {
            self.hydrate_one(&layout.id, &layout.props, &payload.context, parent)?;
            parent = slot_range(parent, &layout.id)
                .map(|r| &parent[r])
                .ok_or_else(|| ClientError::HydrationMismatch {
                    id: layout.id.clone(),
                    reason: "slot container not closed".to_string(),
                })?;
        }
        self.hydrate_one(&payload.target_view_path, &payload.props, &payload.context, parent)?;

        tracing::debug!(elements = ids.len(), view = %payload.target_view_path, "Hydrated");
        Ok(ids)
    }

    fn hydrate_one(&self, id: &str, props: &Props, context: &ClientContext, markup: &str) -> Result<()> {
        let component = self
            .components
            .get(id)
            .ok_or_else(|| ClientError::ComponentNotRegistered { id: id.to_string() })?;
        let target = HydrationTarget {
            id,
            props,
            context,
            markup,
        };
        component
            .hydrate(&target)
            .map_err(|reason| ClientError::HydrationMismatch {
                id: id.to_string(),
                reason,
            })
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.components.keys().collect();
        ids.sort();
        f.debug_struct("ClientRegistry").field("components", &ids).finish()
    }
}
