//! Generation trigger handlers.
//!
//! Both triggers follow the same shape: authorize against the database
//! (fail closed), build the prompt, enqueue with the provider, persist the
//! `starting` prediction row, and hand the caller the external id to watch.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use studia_core::error::CoreError;
use studia_core::prediction::{PredictionStatus, PredictionType};
use studia_core::prompt;
use studia_core::types::DbId;
use studia_db::models::prediction::NewPrediction;
use studia_db::repositories::{CourseRepo, ModuleRepo, PredictionRepo};
use studia_replicate::Engine;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for both generation triggers.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub engine: Engine,
    #[serde(default)]
    pub regenerate: bool,
}

/// Response body: the external id the caller can subscribe to or poll.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub prediction_id: String,
    pub status: PredictionStatus,
    pub engine: Engine,
}

/// POST /api/v1/courses/{id}/generate-cover
///
/// Enqueues a cover generation for the course. Requires `admin` or
/// `instructor`. Rejects with 409 when a cover already exists and
/// `regenerate` is not set.
pub async fn generate_course_cover(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    if course.cover_image_url.is_some() && !input.regenerate {
        return Err(AppError::Core(CoreError::Conflict(
            "Course already has a cover image; pass regenerate to replace it".into(),
        )));
    }

    let prompt = prompt::build_cover_prompt(course.id, &course.title, &course.description);
    let provider_input = serde_json::json!({
        "prompt": prompt,
        "num_outputs": 1,
        "aspect_ratio": "16:9",
        "output_format": "webp",
    });

    let created = state
        .replicate
        .create_prediction(input.engine, &provider_input)
        .await?;

    let prediction = PredictionRepo::create(
        &state.pool,
        &NewPrediction {
            prediction_id: &created.id,
            prediction_type: PredictionType::CourseCover,
            course_id: Some(course.id),
            module_id: None,
            engine: input.engine.as_str(),
            input: &provider_input,
        },
    )
    .await?;

    tracing::info!(
        course_id,
        prediction_id = %prediction.prediction_id,
        engine = %input.engine,
        user_id = staff.user_id,
        "Cover generation enqueued"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GenerateResponse {
                prediction_id: prediction.prediction_id,
                status: prediction.status,
                engine: input.engine,
            },
        }),
    ))
}

/// POST /api/v1/modules/{id}/generate-image
///
/// Enqueues an inline illustration for a module. Requires `admin` or
/// `instructor`.
pub async fn generate_module_image(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(module_id): Path<DbId>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let module = ModuleRepo::find_by_id(&state.pool, module_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }))?;

    let course = CourseRepo::find_by_id(&state.pool, module.course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: module.course_id,
        }))?;

    let prompt = prompt::build_module_prompt(module.id, &course.title, &module.title);
    let provider_input = serde_json::json!({
        "prompt": prompt,
        "num_outputs": 1,
        "aspect_ratio": "4:3",
        "output_format": "webp",
    });

    let created = state
        .replicate
        .create_prediction(input.engine, &provider_input)
        .await?;

    let prediction = PredictionRepo::create(
        &state.pool,
        &NewPrediction {
            prediction_id: &created.id,
            prediction_type: PredictionType::ModuleImage,
            course_id: None,
            module_id: Some(module.id),
            engine: input.engine.as_str(),
            input: &provider_input,
        },
    )
    .await?;

    tracing::info!(
        module_id,
        prediction_id = %prediction.prediction_id,
        engine = %input.engine,
        user_id = staff.user_id,
        "Module image generation enqueued"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GenerateResponse {
                prediction_id: prediction.prediction_id,
                status: prediction.status,
                engine: input.engine,
            },
        }),
    ))
}
