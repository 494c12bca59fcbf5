//! Axum router: maps all URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    health::health,
    insights::get_insights,
    interactions::track_interaction,
    preferences::{get_preferences, reset_preferences, update_preferences},
    recommendations::recommend,
};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/health", get(health))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // Recommender API
        .route("/api/ai/recommendations", post(recommend))
        .route(
            "/api/ai/preferences",
            get(get_preferences).put(update_preferences).delete(reset_preferences),
        )
        .route("/api/ai/insights", get(get_insights))
        .route("/api/ai/track",    post(track_interaction))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
