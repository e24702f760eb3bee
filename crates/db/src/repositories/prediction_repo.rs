//! Repository for the `replicate_predictions` table.
//!
//! The store is the synchronization point between the webhook receiver and
//! the reaper: every terminal-state write carries `WHERE status = 'starting'`
//! so the first terminal writer wins and duplicates match zero rows.

use sqlx::PgPool;
use studia_core::prediction::PredictionStatus;
use studia_core::types::DbId;

use crate::models::prediction::{NewPrediction, Prediction};

/// Column list for `replicate_predictions` queries.
const COLUMNS: &str = "\
    id, prediction_id, status, prediction_type, course_id, module_id, \
    engine, input, output, error, created_at, updated_at, completed_at";

/// Error message recorded by the reaper.
pub const TIMEOUT_ERROR: &str = "Timed out waiting for the generation webhook";

/// Provides CRUD operations for generation predictions.
pub struct PredictionRepo;

impl PredictionRepo {
    /// Insert a new prediction in `starting` state.
    pub async fn create(
        pool: &PgPool,
        input: &NewPrediction<'_>,
    ) -> Result<Prediction, sqlx::Error> {
        let query = format!(
            "INSERT INTO replicate_predictions \
                 (prediction_id, status, prediction_type, course_id, module_id, engine, input) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(input.prediction_id)
            .bind(PredictionStatus::Starting.as_str())
            .bind(input.prediction_type.as_str())
            .bind(input.course_id)
            .bind(input.module_id)
            .bind(input.engine)
            .bind(input.input)
            .fetch_one(pool)
            .await
    }

    /// Find a prediction by its external (provider-assigned) id.
    pub async fn find_by_prediction_id(
        pool: &PgPool,
        prediction_id: &str,
    ) -> Result<Option<Prediction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM replicate_predictions WHERE prediction_id = $1");
        sqlx::query_as::<_, Prediction>(&query)
            .bind(prediction_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a terminal webhook if the row is still `starting`.
    ///
    /// Compare-and-swap: `WHERE status = 'starting'` means only the first
    /// terminal delivery wins; concurrent duplicates and the reaper match
    /// zero rows. Returns the updated row when this call won the race.
    pub async fn complete_if_starting(
        pool: &PgPool,
        prediction_id: &str,
        status: PredictionStatus,
        output: Option<&str>,
        error: Option<&str>,
    ) -> Result<Option<Prediction>, sqlx::Error> {
        debug_assert!(status.is_terminal());
        let query = format!(
            "UPDATE replicate_predictions \
             SET status = $2, output = $3, error = $4, \
                 updated_at = NOW(), completed_at = NOW() \
             WHERE prediction_id = $1 AND status = $5 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(prediction_id)
            .bind(status.as_str())
            .bind(output)
            .bind(error)
            .bind(PredictionStatus::Starting.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record a non-terminal (`starting`) delivery by touching `updated_at`.
    ///
    /// Returns `true` when the row exists and is still `starting`.
    pub async fn touch_if_starting(
        pool: &PgPool,
        prediction_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE replicate_predictions \
             SET updated_at = NOW() \
             WHERE prediction_id = $1 AND status = $2",
        )
        .bind(prediction_id)
        .bind(PredictionStatus::Starting.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Force-fail every `starting` prediction created before the cutoff.
    ///
    /// Batch operation used by the reaper. The status condition makes
    /// overlapping runs and webhook races harmless. Returns the external
    /// ids of the reaped rows so callers can emit failure events.
    pub async fn reap_stale(
        pool: &PgPool,
        cutoff: studia_core::types::Timestamp,
    ) -> Result<Vec<Prediction>, sqlx::Error> {
        let query = format!(
            "UPDATE replicate_predictions \
             SET status = $1, error = $2, updated_at = NOW(), completed_at = NOW() \
             WHERE status = $3 AND created_at < $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(PredictionStatus::Failed.as_str())
            .bind(TIMEOUT_ERROR)
            .bind(PredictionStatus::Starting.as_str())
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// List the most recent predictions for a course (newest first).
    pub async fn list_for_course(
        pool: &PgPool,
        course_id: DbId,
        limit: i64,
    ) -> Result<Vec<Prediction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM replicate_predictions \
             WHERE course_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(course_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
