//! Domain logic for the Studia cover-generation service.
//!
//! Everything in this crate is pure (no database, no HTTP): the prediction
//! state machine, prompt construction, webhook signature verification,
//! module-content manipulation, and the shared bounded-retry helper.

pub mod content;
pub mod error;
pub mod hashing;
pub mod prediction;
pub mod prompt;
pub mod retry;
pub mod roles;
pub mod signature;
pub mod types;
