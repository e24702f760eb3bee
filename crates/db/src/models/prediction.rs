//! Prediction entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studia_core::prediction::{PredictionStatus, PredictionType};
use studia_core::types::{DbId, Timestamp};

/// A row from the `replicate_predictions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prediction {
    pub id: DbId,
    pub prediction_id: String,
    #[sqlx(try_from = "String")]
    pub status: PredictionStatus,
    #[sqlx(try_from = "String")]
    pub prediction_type: PredictionType,
    pub course_id: Option<DbId>,
    pub module_id: Option<DbId>,
    pub engine: String,
    pub input: serde_json::Value,
    pub output: Option<String>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Prediction {
    /// The owning entity id for this prediction's type.
    pub fn owner_id(&self) -> Option<DbId> {
        match self.prediction_type {
            PredictionType::CourseCover => self.course_id,
            PredictionType::ModuleImage => self.module_id,
        }
    }
}

/// Input for inserting a new `starting` prediction row.
#[derive(Debug, Clone)]
pub struct NewPrediction<'a> {
    pub prediction_id: &'a str,
    pub prediction_type: PredictionType,
    pub course_id: Option<DbId>,
    pub module_id: Option<DbId>,
    pub engine: &'a str,
    pub input: &'a serde_json::Value,
}

/// Parsed webhook payload from the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
