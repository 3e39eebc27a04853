//! # Trellis Core
//!
//! Nested-layout server rendering with segment navigation. Views are
//! registered under logical paths, layouts under scopes; a request for a
//! view resolves the chain of layouts above it, composes them through a
//! pluggable [`Component`] capability, and either returns a full document
//! or, for a client that already has outer layouts mounted, just the
//! segment below the deepest layout it can keep.

pub mod component;
pub mod context;
pub mod error;
pub mod handle;
pub mod layout;
pub mod manifest;
pub mod markup;
pub mod navigation;
pub mod payload;
pub mod pipeline;
pub mod registry;
pub mod reporter;
pub mod resolver;
pub mod service;

pub use component::{Component, ComponentCatalog, ComponentError, ComponentRef, PassThrough, Props, SLOT};
pub use context::{
    ClientContext, ContextEnricher, Extensions, RawRequest, RenderContext, RenderContextBuilder,
};
pub use error::{Result, TrellisError};
pub use handle::RegistryHandle;
pub use layout::{LayoutConfig, LayoutDescriptor, LayoutRegistry, RegistrySnapshot, IMPLICIT_ROOT_ID};
pub use manifest::RegistryManifest;
pub use navigation::{
    divergence_index, encode_mounted_chain, parse_mounted_chain, NavigationPlan,
    NavigationResponse, ResponseKind, SegmentResponse, SEGMENT_CONTENT_TYPE,
};
pub use payload::{to_props, ChainProps, HydrationPayload};
pub use pipeline::{
    DocumentShell, RenderMode, RenderPipeline, RenderStream, RenderedOutput, Segment, StreamFailureHook,
};
pub use registry::{ViewEntry, ViewRegistry, ViewRegistryBuilder};
pub use reporter::{CollectingReporter, ErrorReporter, RequestMeta, TracingReporter};
pub use resolver::{LayoutChain, LayoutResolver, ResolvedLayout};
pub use service::Trellis;
