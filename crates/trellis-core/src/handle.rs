//! Atomically reloadable registry

use crate::layout::RegistrySnapshot;
use crate::resolver::LayoutResolver;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared access to the current registry snapshot and its chain cache
///
/// Requests take a [`LayoutResolver`] once and use it for their whole
/// lifetime, so a reload never changes the registry underneath an
/// in-flight render. A reload swaps in a new snapshot with an empty cache;
/// there is no partial invalidation.
#[derive(Debug)]
pub struct RegistryHandle {
    current: RwLock<Arc<LayoutResolver>>,
}

impl RegistryHandle {
    /// Wrap an initial snapshot
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(LayoutResolver::new(Arc::new(snapshot)))),
        }
    }

    /// The resolver for the current snapshot
    pub fn resolver(&self) -> Arc<LayoutResolver> {
        self.current.read().clone()
    }

    /// Replace the whole registry, discarding every cached chain
    pub fn reload(&self, snapshot: RegistrySnapshot) {
        let resolver = Arc::new(LayoutResolver::new(Arc::new(snapshot)));
        let views = resolver.snapshot().views().len();
        *self.current.write() = resolver;
        tracing::info!(views, "Registry reloaded");
    }
}
