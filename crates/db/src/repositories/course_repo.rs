//! Repository for the `courses` table.

use sqlx::PgPool;
use studia_core::types::DbId;

use crate::models::course::Course;

/// Column list for `courses` queries.
const COLUMNS: &str = "\
    id, title, description, cover_image_url, thumbnail_url, created_by, \
    created_at, updated_at";

/// Provides read and cover-update operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a course. Used by admin tooling and test fixtures.
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: &str,
        created_by: Option<DbId>,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (title, description, created_by) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(title)
            .bind(description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a course by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write a generated cover URL into the course.
    ///
    /// Dual-write: `cover_image_url` and `thumbnail_url` receive the same
    /// value so clients reading the legacy field stay consistent. Returns
    /// `false` when the course no longer exists.
    pub async fn set_cover_image(
        pool: &PgPool,
        course_id: DbId,
        url: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses \
             SET cover_image_url = $2, thumbnail_url = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(course_id)
        .bind(url)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
