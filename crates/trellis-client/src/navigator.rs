//! Single-flight client navigation
//!
//! At most one navigation is in flight. A second request for the same
//! target joins the in-flight one; a request for a different target aborts
//! it and starts over. Every navigation gets a generation number and only
//! the current generation may touch the document, so a late response for a
//! superseded target is discarded even if it slipped past the abort.
//!
//! Applying a response (swap plus hydration) happens in one synchronous
//! step after the whole response has arrived. On failure the mount state is
//! left as it was and the document host is asked to load the target from
//! scratch.

use crate::bootstrap::Bootstrap;
use crate::dom::DomHost;
use crate::hydrate::ClientRegistry;
use crate::state::{transition, ClientMountState, NavEvent, NavState};
use crate::transport::{NavigationReply, NavigationTransport};
use crate::{ClientError, Result};
use futures::future::{AbortHandle, Abortable, Aborted, BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use trellis_core::markup::root_range;
use trellis_core::ResponseKind;

/// Result of an applied navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub target: String,
    pub kind: ResponseKind,
    /// Mounted chain after the swap
    pub mounted_chain: Vec<String>,
    /// Identifiers hydrated by this navigation, outermost first
    pub hydrated: Vec<String>,
}

type NavFuture = Shared<BoxFuture<'static, Result<NavigationOutcome>>>;

struct InFlight {
    target: String,
    generation: u64,
    future: NavFuture,
    abort: AbortHandle,
}

struct Inner<T, D> {
    transport: T,
    registry: ClientRegistry,
    data_script_id: String,
    dom: Mutex<D>,
    mount: Mutex<ClientMountState>,
    state: Mutex<NavState>,
    in_flight: Mutex<Option<InFlight>>,
    generation: AtomicU64,
}

/// Drives navigations against a transport and a document host
pub struct Navigator<T, D> {
    inner: Arc<Inner<T, D>>,
}

impl<T, D> Clone for Navigator<T, D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, D> Navigator<T, D>
where
    T: NavigationTransport,
    D: DomHost + 'static,
{
    /// Hydrate the initial document and start in `Idle`
    ///
    /// `bootstrap` must describe the document currently held by `dom`.
    pub fn start(
        bootstrap: &Bootstrap,
        registry: ClientRegistry,
        transport: T,
        dom: D,
        data_script_id: impl Into<String>,
    ) -> Result<Self> {
        let document = dom.document();
        let region = root_range(&document)
            .map(|r| &document[r])
            .ok_or_else(|| ClientError::Decode("document has no root element".to_string()))?;
        registry.hydrate(region, bootstrap.payload())?;
        tracing::info!(chain = ?bootstrap.chain(), "Initial document hydrated");

        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                registry,
                data_script_id: data_script_id.into(),
                dom: Mutex::new(dom),
                mount: Mutex::new(ClientMountState::from_payload(bootstrap.payload())),
                state: Mutex::new(NavState::Idle),
                in_flight: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Current state machine state
    pub fn state(&self) -> NavState {
        self.inner.state.lock().clone()
    }

    /// Snapshot of what is mounted
    pub fn mount_state(&self) -> ClientMountState {
        self.inner.mount.lock().clone()
    }

    /// Read the document host
    pub fn with_dom<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.inner.dom.lock())
    }

    /// Navigate to `target` (a URL path with optional query)
    ///
    /// Resolves with `Cancelled` if a navigation to another target
    /// supersedes this one.
    pub async fn navigate(&self, target: &str) -> Result<NavigationOutcome> {
        let future = {
            let mut in_flight = self.inner.in_flight.lock();
            match in_flight.as_ref() {
                Some(flight) if flight.target == target => {
                    tracing::debug!(target = %target, "Joining in-flight navigation");
                    flight.future.clone()
                }
                _ => {
                    if let Some(previous) = in_flight.take() {
                        tracing::debug!(
                            superseded = %previous.target,
                            target = %target,
                            "Cancelling in-flight navigation"
                        );
                        previous.abort.abort();
                    }
                    let flight = self.begin(target);
                    let future = flight.future.clone();
                    *in_flight = Some(flight);
                    future
                }
            }
        };
        future.await
    }

    /// Start a navigation; called with the in-flight slot locked
    fn begin(&self, target: &str) -> InFlight {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.advance(NavEvent::Navigate {
            target: target.to_string(),
            generation,
        });
        let mounted = self.inner.mount.lock().mounted_chain.clone();

        let (abort, registration) = AbortHandle::new_pair();
        let inner = self.inner.clone();
        let owned_target = target.to_string();
        let future = async move {
            let reply = Abortable::new(inner.transport.fetch(&owned_target, &mounted), registration).await;
            inner.complete(generation, &owned_target, reply)
        }
        .boxed()
        .shared();

        InFlight {
            target: target.to_string(),
            generation,
            future,
            abort,
        }
    }
}

impl<T, D> Inner<T, D>
where
    D: DomHost,
{
    fn advance(&self, event: NavEvent) {
        let mut state = self.state.lock();
        match transition(&state, event) {
            Some(next) => *state = next,
            None => tracing::warn!(state = ?*state, "Ignored invalid navigation transition"),
        }
    }

    fn complete(
        &self,
        generation: u64,
        target: &str,
        reply: std::result::Result<Result<NavigationReply>, Aborted>,
    ) -> Result<NavigationOutcome> {
        // Holding the slot keeps a new navigation from starting mid-swap
        let mut in_flight = self.in_flight.lock();
        let current = self.generation.load(Ordering::SeqCst);
        let Ok(reply) = reply else {
            return Err(ClientError::Cancelled);
        };
        if generation != current {
            tracing::debug!(target = %target, generation, current, "Discarding stale navigation response");
            return Err(ClientError::Cancelled);
        }
        if in_flight.as_ref().is_some_and(|f| f.generation == generation) {
            *in_flight = None;
        }

        let result = reply.and_then(|reply| {
            self.advance(NavEvent::Received);
            self.apply(target, reply)
        });
        match result {
            Ok(outcome) => {
                self.advance(NavEvent::Hydrated);
                tracing::info!(
                    target = %target,
                    kind = outcome.kind.as_str(),
                    hydrated = outcome.hydrated.len(),
                    "Navigation applied"
                );
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(target = %target, category = err.category(), error = %err, "Navigation failed");
                self.advance(NavEvent::Failed(err.clone()));
                self.advance(NavEvent::Settle);
                if err.needs_reload() {
                    self.dom.lock().reload(target);
                }
                Err(err)
            }
        }
    }

    fn apply(&self, target: &str, reply: NavigationReply) -> Result<NavigationOutcome> {
        match reply {
            NavigationReply::Segment(segment) => {
                self.registry.check(&segment.markup, &segment.payload)?;
                let next = self
                    .mount
                    .lock()
                    .after_segment(&segment)
                    .ok_or_else(|| ClientError::SwapTarget {
                        swap_point: segment.swap_point.clone(),
                    })?;

                self.dom.lock().replace_slot(&segment.swap_point, &segment.markup)?;
                let hydrated = self.registry.hydrate(&segment.markup, &segment.payload)?;

                let mounted_chain = next.mounted_chain.clone();
                *self.mount.lock() = next;
                Ok(NavigationOutcome {
                    target: target.to_string(),
                    kind: ResponseKind::Segment,
                    mounted_chain,
                    hydrated,
                })
            }
            NavigationReply::Full(document) => {
                let bootstrap = Bootstrap::from_document(&document, &self.data_script_id)?;
                let region = root_range(&document)
                    .map(|r| &document[r])
                    .ok_or_else(|| ClientError::Decode("document has no root element".to_string()))?;
                self.registry.check(region, bootstrap.payload())?;

                self.dom.lock().replace_document(&document);
                let hydrated = self.registry.hydrate(region, bootstrap.payload())?;

                let next = ClientMountState::from_payload(bootstrap.payload());
                let mounted_chain = next.mounted_chain.clone();
                *self.mount.lock() = next;
                Ok(NavigationOutcome {
                    target: target.to_string(),
                    kind: ResponseKind::Full,
                    mounted_chain,
                    hydrated,
                })
            }
        }
    }
}

impl<T, D> std::fmt::Debug for Navigator<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &*self.inner.state.lock())
            .field("mounted", &self.inner.mount.lock().mounted_chain)
            .finish_non_exhaustive()
    }
}
