//! Course module entity model.

use serde::Serialize;
use sqlx::FromRow;
use studia_core::types::{DbId, Timestamp};

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub position: i32,
    pub content_jsonb: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
