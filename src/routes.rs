// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempts, leaderboard},
    state::AppState,
    utils::identity::require_user,
};

/// Assembles the main application router.
///
/// * Taker-facing attempt routes require a resolved caller identity.
/// * The leaderboard is a read-only reporting view.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(crate::utils::identity::USER_ID_HEADER),
        ]);

    let assessment_routes = Router::new()
        .route("/{id}/leaderboard", get(leaderboard::get_leaderboard))
        // Protected: starting an attempt needs the caller's identity
        .merge(
            Router::new()
                .route("/{id}/attempts", post(attempts::start_attempt))
                .layer(middleware::from_fn(require_user)),
        );

    let attempt_routes = Router::new()
        .route("/{id}", get(attempts::get_paper))
        .route("/{id}/answers/{question_id}", put(attempts::save_answer))
        .route("/{id}/submit", post(attempts::submit_attempt))
        .route("/{id}/result", get(attempts::get_result))
        .layer(middleware::from_fn(require_user));

    Router::new()
        .nest("/api/assessments", assessment_routes)
        .nest("/api/attempts", attempt_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
