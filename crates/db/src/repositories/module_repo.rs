//! Repository for the `modules` table.

use sqlx::PgPool;
use studia_core::types::DbId;

use crate::models::module::Module;

/// Column list for `modules` queries.
const COLUMNS: &str = "\
    id, course_id, title, position, content_jsonb, created_at, updated_at";

/// Provides read and content-update operations for course modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a module. Used by admin tooling and test fixtures.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        title: &str,
        content_jsonb: &serde_json::Value,
    ) -> Result<Module, sqlx::Error> {
        let query = format!(
            "INSERT INTO modules (course_id, title, content_jsonb) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(course_id)
            .bind(title)
            .bind(content_jsonb)
            .fetch_one(pool)
            .await
    }

    /// Find a module by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a module's `content_jsonb`.
    ///
    /// Returns `false` when the module no longer exists.
    pub async fn set_content(
        pool: &PgPool,
        module_id: DbId,
        content: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE modules SET content_jsonb = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(module_id)
        .bind(content)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
