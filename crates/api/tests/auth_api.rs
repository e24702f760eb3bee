//! Integration tests for login and the auth extractors.

mod common;

use axum::http::StatusCode;
use common::{expect_json, get_authed, post_json, seed_course, seed_cover_prediction, seed_user};
use sqlx::PgPool;

fn login_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "email": email, "password": password })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_usable_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user, _token) = seed_user(&pool, "teacher@example.com", "instructor").await;

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        None,
        &login_body("teacher@example.com", "test-password-123"),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;

    assert_eq!(json["data"]["user_id"], user.id);
    assert_eq!(json["data"]["role"], "instructor");
    assert_eq!(json["data"]["token_type"], "Bearer");

    // The issued token passes the auth extractor on a protected route.
    let token = json["data"]["access_token"].as_str().unwrap();
    let course_id = seed_course(&pool, "Rust", "Systems programming").await;
    seed_cover_prediction(&pool, "p-1", course_id).await;

    let response = get_authed(app, "/api/v1/predictions/p-1", token).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"]["prediction_id"], "p-1");
    assert_eq!(json["data"]["status"], "starting");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_is_case_insensitive_on_email(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    seed_user(&pool, "teacher@example.com", "instructor").await;

    let response = post_json(
        app,
        "/api/v1/auth/login",
        None,
        &login_body("Teacher@Example.COM", "test-password-123"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_look_identical(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    seed_user(&pool, "teacher@example.com", "instructor").await;

    let wrong = post_json(
        app.clone(),
        "/api/v1/auth/login",
        None,
        &login_body("teacher@example.com", "nope"),
    )
    .await;
    let wrong_json = expect_json(wrong, StatusCode::UNAUTHORIZED).await;

    let unknown = post_json(
        app,
        "/api/v1/auth/login",
        None,
        &login_body("nobody@example.com", "nope"),
    )
    .await;
    let unknown_json = expect_json(unknown, StatusCode::UNAUTHORIZED).await;

    assert_eq!(wrong_json["error"], unknown_json["error"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_user_cannot_login(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user, _token) = seed_user(&pool, "gone@example.com", "instructor").await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let response = post_json(
        app,
        "/api/v1/auth/login",
        None,
        &login_body("gone@example.com", "test-password-123"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_route_rejects_garbage_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_authed(app.clone(), "/api/v1/predictions/p-1", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = common::get(app, "/api/v1/predictions/p-1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
