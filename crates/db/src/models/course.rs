//! Course entity model.

use serde::Serialize;
use sqlx::FromRow;
use studia_core::types::{DbId, Timestamp};

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub cover_image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
