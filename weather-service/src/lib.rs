pub mod backend;
pub mod cache;
pub mod config;
pub mod geocoding;
pub mod handlers;
pub mod lookup;
pub mod openapi;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::AppState;

/// Build the HTTP application: JSON API, OpenAPI docs, and the static front end.
pub fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/hello", get(handlers::hello))
        .route("/api/weather", get(handlers::get_weather))
        .merge(openapi::swagger_ui())
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
