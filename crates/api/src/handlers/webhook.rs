//! Provider webhook receiver.
//!
//! Replicate POSTs the outcome of every prediction here. Order matters:
//! the HMAC signature is verified over the **raw** body before anything is
//! parsed, and the terminal update is a compare-and-swap so at-least-once
//! delivery cannot re-run propagation.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use studia_core::error::CoreError;
use studia_core::prediction::{PredictionStatus, PredictionType};
use studia_core::{content, signature};
use studia_db::models::prediction::{Prediction, WebhookPayload};
use studia_db::repositories::{CourseRepo, ModuleRepo, PredictionRepo};
use studia_events::{PlatformEvent, EVENT_PREDICTION_FAILED, EVENT_PREDICTION_SUCCEEDED};

use crate::config::AssetConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/webhooks/replicate
///
/// Processes a delivery and answers `{"success": true}`. Duplicate
/// deliveries and deliveries for ids no longer in the store are
/// acknowledged the same way — failing them would only make the provider
/// retry a delivery that can never land.
pub async fn replicate_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    // 1. Signature check over the raw body, before any parsing.
    let header = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    signature::verify(
        state.config.replicate.webhook_secret.as_bytes(),
        &body,
        header,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        AppError::Core(CoreError::Unauthorized("Invalid webhook signature".into()))
    })?;

    // 2. Parse the verified body. An unknown status string fails here.
    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    tracing::info!(
        prediction_id = %payload.id,
        status = %payload.status,
        "Webhook received"
    );

    // 3. Non-terminal progress report: record the heartbeat and stop.
    if !payload.status.is_terminal() {
        PredictionRepo::touch_if_starting(&state.pool, &payload.id).await?;
        return Ok(Json(json!({ "success": true })));
    }

    // A succeeded report without an artifact cannot satisfy the store's
    // output invariant; record it as a failure instead.
    let (status, output, error) =
        if payload.status == PredictionStatus::Succeeded && payload.output.is_none() {
            tracing::warn!(
                prediction_id = %payload.id,
                "Succeeded webhook carried no output, recording as failed"
            );
            (
                PredictionStatus::Failed,
                None,
                Some("Provider reported success without output".to_string()),
            )
        } else {
            (payload.status, payload.output.clone(), payload.error.clone())
        };

    // 4. Terminal delivery: the CAS decides whether this delivery wins.
    let won = PredictionRepo::complete_if_starting(
        &state.pool,
        &payload.id,
        status,
        output.as_deref(),
        error.as_deref(),
    )
    .await?;

    let Some(prediction) = won else {
        match PredictionRepo::find_by_prediction_id(&state.pool, &payload.id).await? {
            Some(existing) => tracing::info!(
                prediction_id = %payload.id,
                status = %existing.status,
                "Duplicate webhook for terminal prediction, ignoring"
            ),
            None => tracing::warn!(
                prediction_id = %payload.id,
                "Webhook for unknown prediction, ignoring"
            ),
        }
        return Ok(Json(json!({ "success": true })));
    };

    // 5. First terminal delivery: propagate and notify.
    match (prediction.status, prediction.output.clone()) {
        (PredictionStatus::Succeeded, Some(output)) => {
            propagate_success(&state, &prediction, &output).await?;
        }
        _ => {
            publish_failure(&state, &prediction).await;
        }
    }

    Ok(Json(json!({ "success": true })))
}

/// Write the generated asset into the owning entity and publish the
/// realtime event.
async fn propagate_success(
    state: &AppState,
    prediction: &Prediction,
    output: &str,
) -> AppResult<()> {
    // Re-host the asset when configured; fall back to the provider URL.
    let url = match &state.config.assets {
        Some(assets) => rehost(assets, &prediction.prediction_id, output)
            .await
            .unwrap_or_else(|| output.to_string()),
        None => output.to_string(),
    };

    match prediction.prediction_type {
        PredictionType::CourseCover => {
            let Some(course_id) = prediction.course_id else {
                // Unreachable given the owner CHECK constraint.
                tracing::error!(
                    prediction_id = %prediction.prediction_id,
                    "course_cover prediction without course_id"
                );
                return Ok(());
            };

            if !CourseRepo::set_cover_image(&state.pool, course_id, &url).await? {
                tracing::warn!(course_id, "Course deleted before cover propagation");
                return Ok(());
            }

            tracing::info!(course_id, url = %url, "Course cover updated");
            state.event_bus.publish(
                PlatformEvent::new(EVENT_PREDICTION_SUCCEEDED)
                    .with_course(course_id)
                    .with_payload(json!({
                        "type": "course.cover_updated",
                        "courseId": course_id,
                        "imageUrl": url,
                        "predictionId": prediction.prediction_id,
                    })),
            );
        }
        PredictionType::ModuleImage => {
            let Some(module_id) = prediction.module_id else {
                tracing::error!(
                    prediction_id = %prediction.prediction_id,
                    "module_image prediction without module_id"
                );
                return Ok(());
            };

            let Some(module) = ModuleRepo::find_by_id(&state.pool, module_id).await? else {
                tracing::warn!(module_id, "Module deleted before image propagation");
                return Ok(());
            };

            let html = content::html_of(&module.content_jsonb);
            match content::prepend_image(html, &url) {
                Some(new_html) => {
                    let new_content = content::with_html(&module.content_jsonb, new_html);
                    ModuleRepo::set_content(&state.pool, module_id, &new_content).await?;
                    tracing::info!(module_id, url = %url, "Module image prepended");
                }
                // Already present: an operator replay after a crash between
                // the CAS and this write. Nothing to do.
                None => tracing::info!(module_id, "Module already contains image, skipping"),
            }

            state.event_bus.publish(
                PlatformEvent::new(EVENT_PREDICTION_SUCCEEDED)
                    .with_course(module.course_id)
                    .with_payload(json!({
                        "type": "module.image_added",
                        "courseId": module.course_id,
                        "moduleId": module_id,
                        "imageUrl": url,
                        "predictionId": prediction.prediction_id,
                    })),
            );
        }
    }

    Ok(())
}

/// Publish the failure event for a prediction that just turned `failed`.
///
/// Resolution failures here are logged and swallowed: the row is already
/// terminal, which is the part that matters.
async fn publish_failure(state: &AppState, prediction: &Prediction) {
    let course_id = match prediction.prediction_type {
        PredictionType::CourseCover => prediction.course_id,
        PredictionType::ModuleImage => match prediction.module_id {
            Some(module_id) => ModuleRepo::find_by_id(&state.pool, module_id)
                .await
                .ok()
                .flatten()
                .map(|m| m.course_id),
            None => None,
        },
    };

    let mut event = PlatformEvent::new(EVENT_PREDICTION_FAILED).with_payload(json!({
        "type": "prediction.failed",
        "courseId": course_id,
        "predictionId": prediction.prediction_id,
        "error": prediction.error,
    }));
    if let Some(course_id) = course_id {
        event = event.with_course(course_id);
    }
    state.event_bus.publish(event);
}

/// Download the asset and store it under the local asset directory.
///
/// Returns the re-hosted public URL, or `None` on any failure — the caller
/// falls back to the provider URL.
async fn rehost(assets: &AssetConfig, prediction_id: &str, url: &str) -> Option<String> {
    let downloaded = match studia_replicate::assets::download(url).await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, url, "Asset download failed, keeping provider URL");
            return None;
        }
    };

    // Provider ids are URL-safe, but never trust them as path segments.
    let safe_id: String = prediction_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let filename = format!("{safe_id}.{}", downloaded.extension);
    let path = assets.dir.join(&filename);

    if let Err(e) = tokio::fs::write(&path, &downloaded.bytes).await {
        tracing::warn!(error = %e, path = %path.display(), "Asset write failed");
        return None;
    }

    Some(format!("{}/assets/{filename}", assets.public_base_url))
}
