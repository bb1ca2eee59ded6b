//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Review sessions
        .route("/reviews/{review_type}/slots", post(handlers::generate_slots))
        .route("/reviews/{review_type}/assignments", post(handlers::commit_assignments))
        .route("/reviews/{review_type}/prerequisites", post(handlers::check_prerequisites))
        .route("/reviews/{review_type}/schedule-exists", post(handlers::check_schedule_exists))
        .route("/reviews/{review_type}/records", get(handlers::list_records))
        // Record maintenance
        .route(
            "/records/{record_id}",
            put(handlers::reschedule_record).delete(handlers::delete_record),
        )
        // Guides and panels
        .route("/guides/auto-assign", post(handlers::auto_assign_guides))
        .route(
            "/teams/{team_id}/guide",
            put(handlers::assign_guide).delete(handlers::remove_guide),
        )
        .route("/teams/{team_id}/available-panels", get(handlers::available_panels))
        .route("/teams/{team_id}/panel", put(handlers::assign_panel));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Commit batches for a whole cohort stay well under this.
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
