//! HTTP-level tests for the `/emails/analysis` batch family.
//!
//! The AI client in the test harness points at an unroutable address,
//! so these tests cover the descriptor endpoints and the empty-queue
//! path; the engine's per-item and stream semantics are covered by the
//! unit tests in `kontor-core` and `kontor-client`.

mod common;

use axum::http::StatusCode;
use common::{auth_get, auth_post, build_test_app, expect_status, get, seed_admin};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn status_requires_auth(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/emails/analysis/status").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_before_any_batch_is_idle(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let app = build_test_app(pool);

    let body = expect_status(
        auth_get(app, "/api/v1/emails/analysis/status", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["processed"], 0);
    assert_eq!(body["data"]["is_processing"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn start_with_empty_queue_creates_no_job(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;

    let body = expect_status(
        auth_post(
            build_test_app(pool.clone()),
            "/api/v1/emails/analysis",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["is_processing"], false);

    // No job row was created.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batch_jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stream_rejects_missing_token(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/emails/analysis/stream").await;
    // Missing query parameter fails extraction before auth.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stream_rejects_invalid_token(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/emails/analysis/stream?token=kaputt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
