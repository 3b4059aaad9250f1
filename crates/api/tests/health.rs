//! Liveness and system-health endpoint tests.

mod common;

use axum::http::StatusCode;
use common::{auth_get, build_test_app, expect_status, get, seed_admin};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn root_health_is_public(pool: PgPool) {
    let app = build_test_app(pool);
    let body = expect_status(get(app, "/health").await, StatusCode::OK).await;
    assert_eq!(body["status"], "ok");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn system_health_requires_auth(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/system/health").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn system_health_reports_database_ok(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let app = build_test_app(pool);

    let body = expect_status(
        auth_get(app, "/api/v1/system/health", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["database"], "ok");
    assert_eq!(body["data"]["status"], "ok");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn system_stats_counts_seeded_state(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let app = build_test_app(pool);

    let body = expect_status(
        auth_get(app, "/api/v1/system/stats", &token).await,
        StatusCode::OK,
    )
    .await;
    // Fresh database: everything zero.
    assert_eq!(body["data"]["unread_emails"], 0);
    assert_eq!(body["data"]["open_contact_requests"], 0);
    assert_eq!(body["data"]["upcoming_bookings"], 0);
}
