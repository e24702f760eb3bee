//! Prediction status and type enums.
//!
//! The provider reports status as a string; we pin it to a tagged enum so an
//! illegal transition is a validation error rather than a silent overwrite.
//! Both enums round-trip through TEXT columns via `TryFrom<String>` (used by
//! `#[sqlx(try_from = "String")]` in the db crate).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a generation request.
///
/// The only legal transitions are `Starting -> Succeeded` and
/// `Starting -> Failed`. Terminal states never transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Succeeded,
    Failed,
}

impl PredictionStatus {
    /// The canonical wire/storage string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
        }
    }

    /// Whether this status is terminal (no further transitions permitted).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PredictionStatus::Succeeded | PredictionStatus::Failed)
    }

    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: PredictionStatus) -> bool {
        match self {
            PredictionStatus::Starting => true,
            // Terminal states only "transition" to themselves (idempotent
            // redelivery), never to anything else.
            _ => *self == next,
        }
    }
}

impl std::str::FromStr for PredictionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starting" => Ok(PredictionStatus::Starting),
            "succeeded" => Ok(PredictionStatus::Succeeded),
            "failed" => Ok(PredictionStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown prediction status: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for PredictionStatus {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a prediction's output feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    CourseCover,
    ModuleImage,
}

impl PredictionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::CourseCover => "course_cover",
            PredictionType::ModuleImage => "module_image",
        }
    }
}

impl std::str::FromStr for PredictionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "course_cover" => Ok(PredictionType::CourseCover),
            "module_image" => Ok(PredictionType::ModuleImage),
            other => Err(CoreError::Validation(format!(
                "Unknown prediction type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for PredictionType {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for PredictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
