//! Integration tests for the generation trigger endpoints.
//!
//! The provider is replaced by a stub HTTP server bound to an ephemeral
//! local port; the contract under test is ours, not Replicate's.

mod common;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::{expect_json, post_json, seed_course, seed_module, seed_user};
use sqlx::PgPool;
use studia_core::prediction::{PredictionStatus, PredictionType};
use studia_db::repositories::{CourseRepo, PredictionRepo};

/// Spawn a stub Replicate API that acknowledges every enqueue.
async fn spawn_stub_provider() -> String {
    let app = Router::new().route(
        "/v1/models/{owner}/{name}/predictions",
        post(|| async {
            Json(serde_json::json!({
                "id": "stub-pred-1",
                "status": "starting",
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub provider should bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub provider crashed");
    });
    format!("http://{addr}")
}

fn flux_body() -> serde_json::Value {
    serde_json::json!({ "engine": "flux" })
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unauthenticated_trigger_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        None,
        &flux_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn student_role_is_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    let (_user, token) = seed_user(&pool, "student@example.com", "student").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &flux_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nothing was enqueued.
    let rows = PredictionRepo::list_for_course(&pool, course_id, 10).await.unwrap();
    assert!(rows.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_staff_fails_closed(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    let (user, token) = seed_user(&pool, "admin@example.com", "admin").await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &flux_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_course_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = seed_user(&pool, "admin@example.com", "admin").await;

    let response = post_json(
        app,
        "/api/v1/courses/999999/generate-cover",
        Some(&token),
        &flux_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_engine_is_a_client_error(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    let (_user, token) = seed_user(&pool, "admin@example.com", "admin").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &serde_json::json!({ "engine": "dalle" }),
    )
    .await;
    assert!(
        response.status().is_client_error(),
        "unexpected status {}",
        response.status()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn existing_cover_conflicts_without_regenerate(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    CourseRepo::set_cover_image(&pool, course_id, "https://img/existing.png")
        .await
        .unwrap();
    let (_user, token) = seed_user(&pool, "admin@example.com", "admin").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &flux_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Happy path against the stub provider
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cover_trigger_enqueues_and_persists_starting_row(pool: PgPool) {
    let provider = spawn_stub_provider().await;
    let app = common::build_test_app_with_provider(pool.clone(), &provider);

    let course_id = seed_course(&pool, "Intro to Rust", "Learn systems programming").await;
    let (_user, token) = seed_user(&pool, "teacher@example.com", "instructor").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &flux_body(),
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;

    assert_eq!(json["data"]["predictionId"], "stub-pred-1");
    assert_eq!(json["data"]["status"], "starting");
    assert_eq!(json["data"]["engine"], "flux");

    let row = PredictionRepo::find_by_prediction_id(&pool, "stub-pred-1")
        .await
        .unwrap()
        .expect("prediction row should exist");
    assert_eq!(row.status, PredictionStatus::Starting);
    assert_eq!(row.prediction_type, PredictionType::CourseCover);
    assert_eq!(row.course_id, Some(course_id));
    assert_eq!(row.engine, "flux");
    // The stored input is the prompt payload sent to the provider.
    assert!(row.input["prompt"].as_str().unwrap().contains("Intro to Rust"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn regenerate_overrides_existing_cover(pool: PgPool) {
    let provider = spawn_stub_provider().await;
    let app = common::build_test_app_with_provider(pool.clone(), &provider);

    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    CourseRepo::set_cover_image(&pool, course_id, "https://img/existing.png")
        .await
        .unwrap();
    let (_user, token) = seed_user(&pool, "admin@example.com", "admin").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &serde_json::json!({ "engine": "recraft", "regenerate": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn module_trigger_persists_module_prediction(pool: PgPool) {
    let provider = spawn_stub_provider().await;
    let app = common::build_test_app_with_provider(pool.clone(), &provider);

    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    let module_id = seed_module(&pool, course_id, "<p>Lesson</p>").await;
    let (_user, token) = seed_user(&pool, "teacher@example.com", "instructor").await;

    let response = post_json(
        app,
        &format!("/api/v1/modules/{module_id}/generate-image"),
        Some(&token),
        &flux_body(),
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["predictionId"], "stub-pred-1");

    let row = PredictionRepo::find_by_prediction_id(&pool, "stub-pred-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.prediction_type, PredictionType::ModuleImage);
    assert_eq!(row.module_id, Some(module_id));
    assert_eq!(row.course_id, None);
}

// ---------------------------------------------------------------------------
// Provider failure surfaces to the caller
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unreachable_provider_surfaces_as_bad_gateway(pool: PgPool) {
    // The default test config points at an unroutable port; the enqueue
    // exhausts its retries and surfaces as a provider error.
    let app = common::build_test_app(pool.clone());
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    let (_user, token) = seed_user(&pool, "admin@example.com", "admin").await;

    let response = post_json(
        app,
        &format!("/api/v1/courses/{course_id}/generate-cover"),
        Some(&token),
        &flux_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // No orphan row was written.
    let rows = PredictionRepo::list_for_course(&pool, course_id, 10).await.unwrap();
    assert!(rows.is_empty());
}
