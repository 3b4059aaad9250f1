//! Shared harness for HTTP-level integration tests.
//!
//! Builds the real application router (same middleware stack as
//! production via `build_app_router`) on top of the per-test database
//! that `#[sqlx::test]` provides, plus request/JSON helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use kontor_api::auth::jwt::{generate_access_token, JwtConfig};
use kontor_api::auth::password::hash_password;
use kontor_api::config::ServerConfig;
use kontor_api::mailer::{Mailer, MailerConfig};
use kontor_api::middleware::rate_limit::RateLimiter;
use kontor_api::router::build_app_router;
use kontor_api::state::AppState;
use kontor_core::roles::ROLE_ADMIN;
use kontor_db::models::user::{CreateUser, User};
use kontor_db::repositories::UserRepo;

/// Password used for every seeded test account.
pub const TEST_PASSWORD: &str = "korrekt-pferd-batterie";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        // Generous budget so tests never trip the limiter by accident.
        rate_limit_per_minute: 10_000,
        lock_stale_mins: 15,
        jwt: test_jwt_config(),
    }
}

fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-with-enough-entropy".to_string(),
        access_token_expiry_mins: 30,
        refresh_token_expiry_days: 14,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// The AI client points at an unroutable local port so an accidental
/// network call fails fast instead of leaving the test hanging.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let ai = kontor_ai::AiClient::new(kontor_ai::AiConfig {
        api_url: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        request_timeout_secs: 1,
    })
    .expect("test AI client should build");

    let mailer = Mailer::new(&MailerConfig {
        host: "localhost".to_string(),
        username: None,
        password: None,
        from_address: "kontor@localhost".to_string(),
        from_name: "Kontor".to_string(),
    })
    .expect("test mailer should build");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(kontor_events::EventBus::default()),
        progress_hub: Arc::new(kontor_events::ProgressHub::default()),
        ai,
        mailer,
        rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_per_minute)),
        started_at: Instant::now(),
    };

    build_app_router(state, &config)
}

/// Seed an active admin and return it with a valid access token.
pub async fn seed_admin(pool: &PgPool) -> (User, String) {
    let input = CreateUser {
        email: "admin@example.org".to_string(),
        display_name: "Test Admin".to_string(),
        password: TEST_PASSWORD.to_string(),
        role: ROLE_ADMIN.to_string(),
    };
    let hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let user = UserRepo::create(pool, &input, &hash)
        .await
        .expect("seeding admin should succeed");

    let token = generate_access_token(user.id, &user.role, &test_jwt_config())
        .expect("token generation should succeed");
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, path: &str) -> Response<Body> {
    send(app, Method::GET, path, None, None).await
}

pub async fn auth_get(app: Router, path: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, path, Some(token), None).await
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, path, None, Some(body)).await
}

pub async fn auth_post_json(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, path, Some(token), Some(body)).await
}

pub async fn auth_post(app: Router, path: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, path, Some(token), None).await
}

pub async fn auth_patch_json(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, path, Some(token), Some(body)).await
}

pub async fn auth_delete(app: Router, path: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, path, Some(token), None).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Assert a status and return the parsed body for further checks.
pub async fn expect_status(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let body = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
