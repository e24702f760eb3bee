pub mod auth;
pub mod generation;
pub mod health;
pub mod predictions;
pub mod webhook;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (subscribe/unsubscribe to courses)
///
/// /auth/login                          login (public)
///
/// /courses/{id}/generate-cover         enqueue cover generation (staff only)
/// /courses/{id}/predictions            generation history for a course
/// /modules/{id}/generate-image         enqueue module illustration (staff only)
///
/// /predictions/{prediction_id}         poll a prediction by external id
///
/// /webhooks/replicate                  provider callback (HMAC-signed)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Authentication routes.
        .nest("/auth", auth::router())
        // Course-scoped generation routes.
        .nest("/courses", generation::course_router())
        // Module-scoped generation routes.
        .nest("/modules", generation::module_router())
        // Prediction polling.
        .nest("/predictions", predictions::router())
        // Provider webhooks.
        .nest("/webhooks", webhook::router())
}
