//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_agent_handler, get_user_handler, health_handler, invalidate_agent_handler,
    invalidate_user_handler, stats_handler, thumbnail_handler, update_summary_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/agents/:id", get(get_agent_handler))
        .route("/agents/:id/cache", delete(invalidate_agent_handler))
        .route("/users/:id", get(get_user_handler))
        .route("/users/:id/summary", put(update_summary_handler))
        .route("/users/:id/cache", delete(invalidate_user_handler))
        .route("/thumbnails", post(thumbnail_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
