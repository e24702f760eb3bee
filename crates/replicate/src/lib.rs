//! HTTP client for the Replicate image-generation API.
//!
//! This crate only *enqueues* work and fetches finished assets — generation
//! results arrive asynchronously via the provider's webhook, handled by the
//! api crate. All outbound calls go through the shared bounded-retry helper.

pub mod assets;
pub mod client;
pub mod engine;

pub use client::{CreatedPrediction, ReplicateClient, ReplicateError};
pub use engine::Engine;
