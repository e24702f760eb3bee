//! Studia event bus.
//!
//! Provides the in-process publish/subscribe hub that connects the webhook
//! receiver and the reaper to the WebSocket realtime notifier:
//!
//! - [`EventBus`] — broadcast hub backed by `tokio::sync::broadcast`.
//! - [`PlatformEvent`] — the canonical domain event envelope.

pub mod bus;

pub use bus::{EventBus, PlatformEvent, EVENT_PREDICTION_FAILED, EVENT_PREDICTION_SUCCEEDED};
