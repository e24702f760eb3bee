//! Prediction read handlers — the polling fallback for clients that missed
//! (or never received) the realtime event.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use studia_core::types::DbId;
use studia_db::repositories::PredictionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for prediction listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for prediction listing.
const DEFAULT_LIMIT: i64 = 20;

/// GET /api/v1/predictions/{prediction_id}
///
/// Returns the current state of a prediction by its external id. `404` when
/// the id is unknown — a reaped-then-cleaned row looks the same as a typo.
pub async fn get_prediction(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let prediction = PredictionRepo::find_by_prediction_id(&state.pool, &prediction_id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    Ok(Json(DataResponse { data: prediction }))
}

/// Query parameters for `GET /api/v1/courses/{id}/predictions`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of results. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
}

/// GET /api/v1/courses/{id}/predictions
///
/// Recent generation history for a course, newest first.
pub async fn list_course_predictions(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let predictions = PredictionRepo::list_for_course(&state.pool, course_id, limit).await?;
    Ok(Json(DataResponse { data: predictions }))
}
