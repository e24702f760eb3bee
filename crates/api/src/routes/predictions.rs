//! Route definitions for prediction polling.
//!
//! ```text
//! GET /{prediction_id}    get_prediction
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::predictions;
use crate::state::AppState;

/// Prediction routes -- mounted at `/predictions`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{prediction_id}", get(predictions::get_prediction))
}
