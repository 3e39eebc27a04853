//! Navigator behavior against an in-process Trellis server

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use trellis_client::{
    Bootstrap, ClientError, ClientMountState, ClientRegistry, DomHost, Inert, MemoryDom, NavState,
    NavigationReply, NavigationTransport, Navigator, DEFAULT_DATA_SCRIPT_ID,
};
use trellis_config::TrellisConfig;
use trellis_core::{
    encode_mounted_chain, ComponentError, LayoutDescriptor, LayoutRegistry, NavigationResponse,
    Props, RawRequest, RegistryHandle, RegistrySnapshot, RenderContext, RenderedOutput,
    ResponseKind, SegmentResponse, Trellis, ViewRegistry, SLOT,
};

fn server() -> Trellis {
    fn page(props: &Props, _: &RenderContext) -> Result<String, ComponentError> {
        Ok(format!("<p>{}</p>", props["target"].as_str().unwrap_or("")))
    }
    fn shell(_: &Props, _: &RenderContext) -> Result<String, ComponentError> {
        Ok(format!("<body>{SLOT}</body>"))
    }
    fn section(props: &Props, _: &RenderContext) -> Result<String, ComponentError> {
        Ok(format!("<section id=\"{}\">{SLOT}</section>", props["name"].as_str().unwrap_or("")))
    }

    let mut views = ViewRegistry::builder();
    for path in ["/shop/cart", "/shop/items", "/admin/users", "/admin/stats"] {
        views = views.register(path, Arc::new(page));
    }
    let mut admin = serde_json::Map::new();
    admin.insert("name".into(), json!("admin"));
    let mut shop = serde_json::Map::new();
    shop.insert("name".into(), json!("shop"));
    let layouts = LayoutRegistry::new(vec![
        LayoutDescriptor::new("Root", "/", Arc::new(shell)),
        LayoutDescriptor::new("Admin", "/admin", Arc::new(section)).with_config(admin),
        LayoutDescriptor::new("Shop", "/shop", Arc::new(section)).with_config(shop),
    ])
    .unwrap();
    let snapshot = RegistrySnapshot::new(views.build().unwrap(), layouts).unwrap();
    Trellis::new(Arc::new(RegistryHandle::new(snapshot)), &TrellisConfig::default())
}

/// Answers navigations by calling the core service directly
#[derive(Clone)]
struct InProcess {
    trellis: Trellis,
    gates: HashMap<String, Arc<Notify>>,
    failing: HashSet<String>,
    tamper: Option<fn(&mut SegmentResponse)>,
    send_mounted: bool,
    calls: Arc<AtomicUsize>,
}

impl InProcess {
    fn new(trellis: Trellis) -> Self {
        Self {
            trellis,
            gates: HashMap::new(),
            failing: HashSet::new(),
            tamper: None,
            send_mounted: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Rewrite every segment before handing it to the navigator
    fn tampering(mut self, tamper: fn(&mut SegmentResponse)) -> Self {
        self.tamper = Some(tamper);
        self
    }

    /// Drop the mounted-chain header so the server always answers in full
    fn without_mounted_chain(mut self) -> Self {
        self.send_mounted = false;
        self
    }

    fn gate(mut self, target: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(target.to_string(), gate);
        self
    }

    fn failing(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }
}

#[async_trait]
impl NavigationTransport for InProcess {
    async fn fetch(&self, target: &str, mounted: &[String]) -> trellis_client::Result<NavigationReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(target) {
            gate.notified().await;
        }
        if self.failing.contains(target) {
            return Err(ClientError::Status {
                status: 500,
                target: target.to_string(),
            });
        }

        let mut request = RawRequest::get(target);
        if self.send_mounted && !mounted.is_empty() {
            request = request.header(
                &self.trellis.navigation().mounted_header,
                encode_mounted_chain(mounted),
            );
        }
        match self.trellis.handle(target, json!({"target": target}), &request) {
            Ok(NavigationResponse::Segment(mut segment)) => {
                if let Some(tamper) = self.tamper {
                    tamper(&mut segment);
                }
                Ok(NavigationReply::Segment(segment))
            }
            Ok(NavigationResponse::Full(RenderedOutput::Document(doc))) => Ok(NavigationReply::Full(doc)),
            Ok(NavigationResponse::Full(RenderedOutput::Stream(_))) => {
                Err(ClientError::Decode("unexpected stream".to_string()))
            }
            Err(err) if err.is_not_found() => Err(ClientError::Status {
                status: 404,
                target: target.to_string(),
            }),
            Err(err) => Err(ClientError::Transport(err.to_string())),
        }
    }
}

fn first_load(trellis: &Trellis, target: &str) -> String {
    match trellis
        .handle(target, json!({"target": target}), &RawRequest::get(target))
        .unwrap()
    {
        NavigationResponse::Full(RenderedOutput::Document(doc)) => doc,
        other => panic!("expected a document, got {other:?}"),
    }
}

fn registry() -> ClientRegistry {
    ["Root", "Admin", "Shop", "/shop/cart", "/shop/items", "/admin/users", "/admin/stats"]
        .into_iter()
        .fold(ClientRegistry::new(), |r, id| r.with(id, Inert))
}

fn navigator(transport: InProcess, start_at: &str) -> Navigator<InProcess, MemoryDom> {
    let html = first_load(&transport.trellis, start_at);
    let bootstrap = Bootstrap::from_document(&html, DEFAULT_DATA_SCRIPT_ID).unwrap();
    Navigator::start(&bootstrap, registry(), transport, MemoryDom::new(html), DEFAULT_DATA_SCRIPT_ID)
        .unwrap()
}

fn root_of(document: &str) -> String {
    let range = trellis_core::markup::root_range(document).unwrap();
    document[range].to_string()
}

#[tokio::test]
async fn swap_matches_a_fresh_full_render() {
    let trellis = server();
    let nav = navigator(InProcess::new(trellis.clone()), "/shop/cart");

    for target in ["/shop/items", "/admin/users", "/admin/stats", "/shop/cart"] {
        let outcome = nav.navigate(target).await.unwrap();
        assert_eq!(outcome.kind, ResponseKind::Segment);

        let fresh = first_load(&trellis, target);
        let swapped = nav.with_dom(|dom| dom.document());
        assert_eq!(root_of(&swapped), root_of(&fresh), "after navigating to {target}");
        assert_eq!(nav.mount_state().view_path(), Some(target));
    }
    assert!(nav.with_dom(|dom| dom.reloads().is_empty()));
}

#[tokio::test]
async fn segment_hydrates_only_the_swapped_suffix() {
    let nav = navigator(InProcess::new(server()), "/shop/cart");

    let sibling = nav.navigate("/shop/items").await.unwrap();
    assert_eq!(sibling.hydrated, vec!["/shop/items"]);

    let across = nav.navigate("/admin/users").await.unwrap();
    assert_eq!(across.hydrated, vec!["Admin", "/admin/users"]);
    assert_eq!(across.mounted_chain, vec!["Root", "Admin", "/admin/users"]);
    assert_eq!(nav.state(), NavState::Hydrated { target: "/admin/users".into() });
}

#[tokio::test]
async fn same_navigation_twice_is_idempotent() {
    let nav = navigator(InProcess::new(server()), "/shop/cart");

    nav.navigate("/admin/users").await.unwrap();
    let once = nav.mount_state();
    let doc_once = nav.with_dom(|dom| dom.document());

    nav.navigate("/admin/users").await.unwrap();
    assert_eq!(nav.mount_state(), once);
    assert_eq!(nav.with_dom(|dom| dom.document()), doc_once);
}

#[tokio::test]
async fn duplicate_targets_share_one_request() {
    let gate = Arc::new(Notify::new());
    let transport = InProcess::new(server()).gate("/admin/users", gate.clone());
    let calls = transport.calls.clone();
    let nav = navigator(transport, "/shop/cart");

    let (first, second, ()) = tokio::join!(
        nav.navigate("/admin/users"),
        nav.navigate("/admin/users"),
        async { gate.notify_one() }
    );

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(nav.with_dom(|dom| dom.swaps()), 1);
}

#[tokio::test]
async fn newer_target_cancels_in_flight_navigation() {
    let never = Arc::new(Notify::new());
    let transport = InProcess::new(server()).gate("/admin/users", never);
    let nav = navigator(transport, "/shop/cart");

    let (stale, fresh) = tokio::join!(nav.navigate("/admin/users"), nav.navigate("/shop/items"));

    assert_eq!(stale.unwrap_err(), ClientError::Cancelled);
    let fresh = fresh.unwrap();
    assert_eq!(fresh.mounted_chain, vec!["Root", "Shop", "/shop/items"]);
    assert_eq!(nav.mount_state().mounted_chain, fresh.mounted_chain);
    assert!(nav.with_dom(|dom| dom.reloads().is_empty()));
}

#[tokio::test]
async fn server_error_leaves_mount_state_and_reloads() {
    let transport = InProcess::new(server()).failing("/admin/stats");
    let nav = navigator(transport, "/shop/cart");
    let before = nav.mount_state();
    let doc_before = nav.with_dom(|dom| dom.document());

    let err = nav.navigate("/admin/stats").await.unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 500, .. }));
    assert_eq!(nav.state(), NavState::Idle);
    assert_eq!(nav.mount_state(), before);
    assert_eq!(nav.with_dom(|dom| dom.document()), doc_before);
    assert_eq!(nav.with_dom(|dom| dom.reloads().to_vec()), vec!["/admin/stats"]);
}

#[tokio::test]
async fn unregistered_component_is_caught_before_the_swap() {
    let trellis = server();
    let html = first_load(&trellis, "/shop/cart");
    let bootstrap = Bootstrap::from_document(&html, DEFAULT_DATA_SCRIPT_ID).unwrap();
    let registry = ClientRegistry::new()
        .with("Root", Inert)
        .with("Shop", Inert)
        .with("/shop/cart", Inert)
        .with("/admin/users", Inert);
    let nav = Navigator::start(
        &bootstrap,
        registry,
        InProcess::new(trellis),
        MemoryDom::new(html.clone()),
        DEFAULT_DATA_SCRIPT_ID,
    )
    .unwrap();

    let err = nav.navigate("/admin/users").await.unwrap_err();

    assert_eq!(err, ClientError::ComponentNotRegistered { id: "Admin".into() });
    assert_eq!(nav.with_dom(|dom| dom.document()), html);
    assert_eq!(nav.with_dom(|dom| dom.swaps()), 0);
    assert_eq!(nav.mount_state().view_path(), Some("/shop/cart"));
}

#[tokio::test]
async fn unknown_target_is_a_status_error() {
    let nav = navigator(InProcess::new(server()), "/shop/cart");
    let err = nav.navigate("/nowhere").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[tokio::test]
async fn malformed_segment_is_rejected_before_the_swap() {
    let transport = InProcess::new(server()).tampering(|segment| {
        segment.markup = "<p>no slot for the section layout</p>".to_string();
    });
    let nav = navigator(transport, "/shop/cart");
    let before = nav.mount_state();
    let doc_before = nav.with_dom(|dom| dom.document());

    let err = nav.navigate("/admin/users").await.unwrap_err();

    assert!(matches!(err, ClientError::HydrationMismatch { .. }));
    assert_eq!(nav.with_dom(|dom| dom.document()), doc_before);
    assert_eq!(nav.with_dom(|dom| dom.swaps()), 0);
    assert_eq!(nav.mount_state(), before);
    assert_eq!(nav.with_dom(|dom| dom.reloads().to_vec()), vec!["/admin/users"]);
}

#[tokio::test]
async fn full_response_replaces_the_whole_document() {
    let trellis = server();
    let nav = navigator(InProcess::new(trellis.clone()).without_mounted_chain(), "/shop/cart");

    let outcome = nav.navigate("/admin/users").await.unwrap();

    let fresh = first_load(&trellis, "/admin/users");
    let bootstrap = Bootstrap::from_document(&fresh, DEFAULT_DATA_SCRIPT_ID).unwrap();
    assert_eq!(outcome.kind, ResponseKind::Full);
    assert_eq!(outcome.hydrated, vec!["Root", "Admin", "/admin/users"]);
    assert_eq!(nav.with_dom(|dom| dom.document()), fresh);
    assert_eq!(nav.with_dom(|dom| dom.swaps()), 1);
    assert_eq!(nav.mount_state(), ClientMountState::from_payload(bootstrap.payload()));
    assert_eq!(nav.state(), NavState::Hydrated { target: "/admin/users".into() });
}
