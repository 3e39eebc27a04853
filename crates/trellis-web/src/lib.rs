//! # Trellis Web
//!
//! Axum adapter for the Trellis core: bind HTTP routes to logical views,
//! negotiate full documents and segments, stream documents, map failures
//! to error pages, and start the server.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trellis_config::TrellisConfig;
//! use trellis_core::{ComponentCatalog, Trellis};
//! use trellis_web::{load_registry, start_server, view_route};
//!
//! # async fn run(catalog: ComponentCatalog) -> trellis_web::Result<()> {
//! let config = TrellisConfig::default();
//! let registry = load_registry(&config, &catalog).await?;
//! let trellis = Trellis::new(Arc::new(registry), &config);
//! let views = view_route("/users/{id}", "/users/[id]", |req: trellis_web::ViewRequest| async move {
//!     Ok(serde_json::json!({ "id": req.param("id") }))
//! });
//! start_server(&config, trellis, views).await
//! # }
//! ```

pub mod routes;
pub mod server;

mod assets;
mod error;
mod state;

pub use assets::{static_routes, STATIC_PREFIX};
pub use error::{error_document, Result, WebError};
pub use routes::{raw_request, view_route, ViewRequest};
pub use server::{build_router, load_registry, reload_registry, start_server};
pub use state::TrellisState;
pub use trellis_config::TrellisConfig;
