use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use studia_api::auth::jwt::{generate_access_token, JwtConfig};
use studia_api::auth::password::hash_password;
use studia_api::config::{ReaperConfig, ReplicateConfig, ServerConfig};
use studia_api::router::build_app_router;
use studia_api::state::AppState;
use studia_api::ws::WsManager;
use studia_core::signature;
use studia_db::models::user::User;
use studia_db::repositories::UserRepo;
use studia_events::EventBus;
use studia_replicate::ReplicateClient;

/// Webhook shared secret used across the test suites.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_integration_test";

/// Build a test `ServerConfig` with safe defaults.
///
/// The provider base URL points at an unroutable local port; tests that
/// exercise the enqueue path override it via [`build_test_app_with_provider`].
pub fn test_config() -> ServerConfig {
    test_config_with_provider("http://127.0.0.1:9")
}

/// Build a test `ServerConfig` targeting a specific provider base URL.
pub fn test_config_with_provider(provider_base_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        replicate: ReplicateConfig {
            api_token: "r8_test_token".to_string(),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            webhook_url: "http://localhost:3000/api/v1/webhooks/replicate".to_string(),
            base_url: provider_base_url.to_string(),
        },
        reaper: ReaperConfig {
            timeout: Duration::from_secs(30 * 60),
            interval: Duration::from_secs(300),
        },
        assets: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config()).0
}

/// Build the app against a running stub provider.
pub fn build_test_app_with_provider(pool: PgPool, provider_base_url: &str) -> Router {
    build_test_app_with_config(pool, test_config_with_provider(provider_base_url)).0
}

/// Build the app and also return its state for direct inspection.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> (Router, AppState) {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        replicate: Arc::new(ReplicateClient::with_base_url(
            config.replicate.base_url.clone(),
            config.replicate.api_token.clone(),
            config.replicate.webhook_url.clone(),
        )),
        event_bus: Arc::new(EventBus::default()),
    };
    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue an authenticated GET request.
pub async fn get_authed(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a JSON POST request, optionally authenticated.
pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// POST a raw webhook body with an explicit signature header.
pub async fn post_webhook(
    app: Router,
    body: &str,
    signature_header: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/webhooks/replicate")
        .header("content-type", "application/json");
    if let Some(sig) = signature_header {
        builder = builder.header(signature::SIGNATURE_HEADER, sig);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// POST a webhook body signed with the test secret.
pub async fn post_signed_webhook(app: Router, body: &str) -> Response<Body> {
    let sig = format!(
        "sha256={}",
        signature::sign(TEST_WEBHOOK_SECRET.as_bytes(), body.as_bytes())
    );
    post_webhook(app, body, Some(&sig)).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status and return the JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with the given role and return it with a valid token.
pub async fn seed_user(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let hash = hash_password("test-password-123").expect("hashing should succeed");
    let user = UserRepo::create(pool, email, &hash, "Test User", role)
        .await
        .expect("user insert should succeed");
    let token =
        generate_access_token(user.id, &test_config().jwt).expect("token generation should succeed");
    (user, token)
}

/// Insert a course and return its id.
pub async fn seed_course(pool: &PgPool, title: &str, description: &str) -> i64 {
    studia_db::repositories::CourseRepo::create(pool, title, description, None)
        .await
        .expect("course insert should succeed")
        .id
}

/// Insert a module with the given HTML content and return its id.
pub async fn seed_module(pool: &PgPool, course_id: i64, html: &str) -> i64 {
    studia_db::repositories::ModuleRepo::create(
        pool,
        course_id,
        "Lesson",
        &serde_json::json!({ "html": html }),
    )
    .await
    .expect("module insert should succeed")
    .id
}

/// Insert a `starting` prediction row for a course cover.
pub async fn seed_cover_prediction(pool: &PgPool, prediction_id: &str, course_id: i64) {
    studia_db::repositories::PredictionRepo::create(
        pool,
        &studia_db::models::prediction::NewPrediction {
            prediction_id,
            prediction_type: studia_core::prediction::PredictionType::CourseCover,
            course_id: Some(course_id),
            module_id: None,
            engine: "flux",
            input: &serde_json::json!({ "prompt": "test" }),
        },
    )
    .await
    .expect("prediction insert should succeed");
}

/// Insert a `starting` prediction row for a module image.
pub async fn seed_module_prediction(pool: &PgPool, prediction_id: &str, module_id: i64) {
    studia_db::repositories::PredictionRepo::create(
        pool,
        &studia_db::models::prediction::NewPrediction {
            prediction_id,
            prediction_type: studia_core::prediction::PredictionType::ModuleImage,
            course_id: None,
            module_id: Some(module_id),
            engine: "flux",
            input: &serde_json::json!({ "prompt": "test" }),
        },
    )
    .await
    .expect("prediction insert should succeed");
}
