//! Foodgram - recipe sharing backend
//!
//! Users publish recipes, favorite them, follow authors and download an
//! aggregated shopping list for the recipes in their cart.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the complete application router.
///
/// - `/api/*` - REST API
/// - `/s/:code` - short link redirects
/// - `/media/*` - uploaded images
pub fn app(state: AppState) -> Router {
    let media_root = state.media.root().to_path_buf();
    let max_body_size = state.config.server.max_body_size;

    Router::new()
        .nest("/api", api::routes(state.clone()))
        .merge(api::short_link_routes())
        .nest_service("/media", ServeDir::new(media_root))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
