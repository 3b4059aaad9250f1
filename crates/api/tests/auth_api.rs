//! HTTP-level tests for the `/auth` endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    auth_get, build_test_app, expect_status, post_json, seed_admin, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_pair(pool: PgPool) {
    let (admin, _token) = seed_admin(&pool).await;
    let app = build_test_app(pool);

    let body = expect_status(
        post_json(
            app,
            "/api/v1/auth/login",
            json!({ "email": admin.email, "password": TEST_PASSWORD }),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
    assert_eq!(body["user"]["email"], admin.email);
    // The hash must never appear in a response.
    assert!(body["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_is_unauthorized(pool: PgPool) {
    let (admin, _token) = seed_admin(&pool).await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": admin.email, "password": "falsches-passwort" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn issued_access_token_authenticates_requests(pool: PgPool) {
    let (admin, _token) = seed_admin(&pool).await;
    let app = build_test_app(pool.clone());

    let body = expect_status(
        post_json(
            app,
            "/api/v1/auth/login",
            json!({ "email": admin.email, "password": TEST_PASSWORD }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let access = body["access_token"].as_str().unwrap().to_string();

    let app = build_test_app(pool);
    let response = auth_get(app, "/api/v1/mailboxes", &access).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let (admin, _token) = seed_admin(&pool).await;

    let body = expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/auth/login",
            json!({ "email": admin.email, "password": TEST_PASSWORD }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    // First refresh succeeds and returns a new pair.
    let body = expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/auth/refresh",
            json!({ "refresh_token": refresh }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert!(body["refresh_token"].as_str().is_some());

    // The old token was rotated out and must not work twice.
    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_the_refresh_token(pool: PgPool) {
    let (admin, _token) = seed_admin(&pool).await;

    let body = expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/auth/login",
            json!({ "email": admin.email, "password": TEST_PASSWORD }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
