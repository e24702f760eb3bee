//! Route definitions for provider webhooks.
//!
//! ```text
//! POST /replicate    replicate_webhook (HMAC-signed, no session auth)
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Webhook routes -- mounted at `/webhooks`.
pub fn router() -> Router<AppState> {
    Router::new().route("/replicate", post(webhook::replicate_webhook))
}
