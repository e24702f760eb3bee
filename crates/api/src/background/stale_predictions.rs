//! Stale-prediction reaper.
//!
//! A webhook that never arrives would leave its prediction `starting`
//! forever. This task periodically force-fails `starting` rows older than
//! the configured timeout and publishes the same failure event a failed
//! webhook would, so waiting clients are released. The conditional UPDATE
//! in the repository makes concurrent webhook deliveries and overlapping
//! runs harmless.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use studia_core::prediction::PredictionType;
use studia_db::repositories::{ModuleRepo, PredictionRepo};
use studia_events::{EventBus, PlatformEvent, EVENT_PREDICTION_FAILED};
use tokio_util::sync::CancellationToken;

use crate::config::ReaperConfig;

/// Run the stale-prediction reaper loop.
///
/// Runs until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    event_bus: Arc<EventBus>,
    config: ReaperConfig,
    cancel: CancellationToken,
) {
    tracing::info!(
        timeout_secs = config.timeout.as_secs(),
        interval_secs = config.interval.as_secs(),
        "Stale-prediction reaper started"
    );

    let mut interval = tokio::time::interval(config.interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stale-prediction reaper stopping");
                break;
            }
            _ = interval.tick() => {
                run_once(&pool, &event_bus, &config).await;
            }
        }
    }
}

/// Execute one reap pass.
///
/// Exposed separately so tests can drive the reaper without the timer.
pub async fn run_once(pool: &PgPool, event_bus: &EventBus, config: &ReaperConfig) {
    let cutoff = Utc::now()
        - chrono::Duration::from_std(config.timeout).unwrap_or(chrono::Duration::minutes(30));

    let reaped = match PredictionRepo::reap_stale(pool, cutoff).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Stale-prediction reap failed");
            return;
        }
    };

    if reaped.is_empty() {
        tracing::debug!("Stale-prediction reaper: nothing to reap");
        return;
    }

    tracing::info!(count = reaped.len(), "Stale predictions force-failed");

    for prediction in reaped {
        // Resolve the affected course for the realtime event. A lookup
        // failure only degrades notification, not the reap itself.
        let course_id = match prediction.prediction_type {
            PredictionType::CourseCover => prediction.course_id,
            PredictionType::ModuleImage => match prediction.module_id {
                Some(module_id) => ModuleRepo::find_by_id(pool, module_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|m| m.course_id),
                None => None,
            },
        };

        let mut event = PlatformEvent::new(EVENT_PREDICTION_FAILED).with_payload(
            serde_json::json!({
                "type": "prediction.failed",
                "courseId": course_id,
                "predictionId": prediction.prediction_id,
                "error": prediction.error,
            }),
        );
        if let Some(course_id) = course_id {
            event = event.with_course(course_id);
        }
        event_bus.publish(event);
    }
}
