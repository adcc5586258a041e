//! API Routes
//!
//! Configures the Axum router with all record store endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_all_handler, get_missing_key_handler, get_record_handler, get_ttl_key_handler,
    health_handler, set_record_handler, set_ttl_handler, stats_handler, AppState,
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
        .route("/record", post(set_record_handler).get(get_all_handler))
        .route("/record/ttl", post(set_ttl_handler).get(get_ttl_key_handler))
        .route("/record/", get(get_missing_key_handler))
        .route("/record/:key", get(get_record_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
