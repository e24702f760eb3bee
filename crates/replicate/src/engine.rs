//! Generation engine selection.

use serde::{Deserialize, Serialize};

/// The image models a caller can choose between.
///
/// Each variant maps to a pinned Replicate model slug so a request is
/// reproducible regardless of upstream "latest" pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Flux,
    Recraft,
    Proteus,
}

impl Engine {
    /// The wire/storage name of this engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Flux => "flux",
            Engine::Recraft => "recraft",
            Engine::Proteus => "proteus",
        }
    }

    /// The Replicate model slug this engine enqueues against.
    pub fn model(&self) -> &'static str {
        match self {
            Engine::Flux => "black-forest-labs/flux-schnell",
            Engine::Recraft => "recraft-ai/recraft-v3",
            Engine::Proteus => "datacte/proteus-v0.3",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
