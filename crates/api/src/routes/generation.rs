//! Route definitions for the asynchronous image-generation pipeline.
//!
//! These routes are merged into the `/courses` and `/modules` nesting
//! points rather than creating a top-level prefix.
//!
//! ```text
//! POST /{id}/generate-cover    generate_course_cover (staff only)
//! GET  /{id}/predictions       list_course_predictions
//!
//! POST /{id}/generate-image    generate_module_image (staff only)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generation, predictions};
use crate::state::AppState;

/// Routes merged into the `/courses` nest.
///
/// ```text
/// POST /{id}/generate-cover
/// GET  /{id}/predictions
/// ```
pub fn course_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/generate-cover", post(generation::generate_course_cover))
        .route("/{id}/predictions", get(predictions::list_course_predictions))
}

/// Routes merged into the `/modules` nest.
///
/// ```text
/// POST /{id}/generate-image
/// ```
pub fn module_router() -> Router<AppState> {
    Router::new().route("/{id}/generate-image", post(generation::generate_module_image))
}
