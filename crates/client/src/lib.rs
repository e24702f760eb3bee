//! Client wrapper for the generation pipeline.
//!
//! [`GenerationClient`] drives the full cycle from the caller's side:
//! trigger a generation over HTTP, then wait for the realtime WebSocket
//! event — with a hard overall deadline and a polling fallback, so a missed
//! frame or a dropped socket never blocks the caller indefinitely.

mod client;
mod messages;

pub use client::{ClientConfig, ClientError, GenerationClient, TriggeredGeneration, WaitOutcome};
pub use messages::ServerFrame;
pub use studia_replicate::Engine;
