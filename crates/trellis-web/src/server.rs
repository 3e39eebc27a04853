//! Server assembly
//!
//! Registry loading from the configured manifest, the application router
//! with CORS and body limits, and the listener loop.

use crate::assets::static_routes;
use crate::routes::health_routes;
use crate::{Result, TrellisState, WebError};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use trellis_config::TrellisConfig;
use trellis_core::{ComponentCatalog, RegistryHandle, RegistryManifest, Trellis};

/// Read the manifest named in the configuration and link it against `catalog`
pub async fn load_registry(config: &TrellisConfig, catalog: &ComponentCatalog) -> Result<RegistryHandle> {
    let snapshot = read_manifest(config, catalog).await?;
    Ok(RegistryHandle::new(snapshot))
}

/// Re-read the manifest and swap it in atomically
///
/// On any error the running registry is left untouched.
pub async fn reload_registry(
    handle: &RegistryHandle,
    config: &TrellisConfig,
    catalog: &ComponentCatalog,
) -> Result<()> {
    let snapshot = read_manifest(config, catalog).await?;
    handle.reload(snapshot);
    Ok(())
}

async fn read_manifest(
    config: &TrellisConfig,
    catalog: &ComponentCatalog,
) -> Result<trellis_core::RegistrySnapshot> {
    let path = config
        .registry
        .manifest_path
        .as_ref()
        .ok_or_else(|| WebError::Config("registry.manifest_path is not set".to_string()))?;
    let manifest = RegistryManifest::load(path).await?;
    Ok(manifest.into_snapshot(catalog)?)
}

/// Assemble the application router around the host's view routes
pub fn build_router(config: &TrellisConfig, trellis: Trellis, views: Router<TrellisState>) -> Result<Router> {
    let state = TrellisState::new(trellis)?;

    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", config.server.port),
        format!("http://127.0.0.1:{}", config.server.port),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, state.mounted_header().clone()])
        .expose_headers([state.response_header().clone()]);

    Ok(Router::new()
        .merge(views)
        .merge(health_routes())
        .with_state(state)
        .merge(static_routes(config.server.static_dir.as_deref()))
        .layer(DefaultBodyLimit::max(config.server.max_request_bytes()))
        .layer(cors))
}

/// Validate configuration, bind, and serve until the listener fails
pub async fn start_server(config: &TrellisConfig, trellis: Trellis, views: Router<TrellisState>) -> Result<()> {
    config.validate()?;
    let app = build_router(config, trellis, views)?;

    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| WebError::Config(format!("Invalid address: {e}")))?;

    tracing::info!(addr = %addr, "Starting Trellis server");

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(WebError::Io)?;

    axum::serve(listener, app).await.map_err(WebError::Io)?;

    Ok(())
}
