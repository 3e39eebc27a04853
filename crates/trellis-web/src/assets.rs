//! Static asset serving

use axum::Router;
use tower_http::services::ServeDir;

/// Mount point for static assets (client entry, stylesheets)
pub const STATIC_PREFIX: &str = "/static";

/// Serve `dir` under [`STATIC_PREFIX`], or nothing when no directory is set
pub fn static_routes<S>(static_dir: Option<&str>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir, prefix = STATIC_PREFIX, "Serving static assets");
            Router::new().nest_service(STATIC_PREFIX, ServeDir::new(dir))
        }
        None => Router::new(),
    }
}
