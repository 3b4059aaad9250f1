//! HTTP-level tests for booking slots and bookings, including the
//! generated series and the double-booking conflict.

mod common;

use axum::http::StatusCode;
use common::{
    auth_delete, auth_post, auth_post_json, build_test_app, expect_status, get, post_json,
    seed_admin,
};
use serde_json::json;
use sqlx::PgPool;

async fn seed_slot(pool: &PgPool, token: &str) -> i64 {
    let body = expect_status(
        auth_post_json(
            build_test_app(pool.clone()),
            "/api/v1/booking-slots",
            token,
            json!({
                "starts_at": "2025-06-02T09:00:00Z",
                "ends_at": "2025-06-02T09:45:00Z"
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    body["data"]["id"].as_i64().unwrap()
}

fn booking_payload(slot_id: i64) -> serde_json::Value {
    json!({
        "slot_id": slot_id,
        "customer_name": "Max Mustermann",
        "customer_email": "max@example.org",
        "customer_phone": "+49301112222"
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn slot_creation_requires_auth(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/booking-slots",
        json!({ "starts_at": "2025-06-02T09:00:00Z", "ends_at": "2025-06-02T09:45:00Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn series_generates_expected_slots(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;

    // Mondays 09:00-12:00, 60-minute slots, no breaks, one week:
    // exactly three slots on the single Monday in range.
    let body = expect_status(
        auth_post_json(
            build_test_app(pool.clone()),
            "/api/v1/booking-slots/series",
            &token,
            json!({
                "first_day": "2025-06-02",
                "last_day": "2025-06-08",
                "weekdays": ["Mon"],
                "day_start": "09:00:00",
                "day_end": "12:00:00",
                "slot_minutes": 60,
                "break_minutes": 0
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // Re-running the same series is idempotent: collisions are skipped.
    let body = expect_status(
        auth_post_json(
            build_test_app(pool),
            "/api/v1/booking-slots/series",
            &token,
            json!({
                "first_day": "2025-06-02",
                "last_day": "2025-06-08",
                "weekdays": ["Mon"],
                "day_start": "09:00:00",
                "day_end": "12:00:00",
                "slot_minutes": 60,
                "break_minutes": 0
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn series_with_bad_range_is_rejected(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let response = auth_post_json(
        build_test_app(pool),
        "/api/v1/booking-slots/series",
        &token,
        json!({
            "first_day": "2025-06-08",
            "last_day": "2025-06-02",
            "weekdays": ["Mon"],
            "day_start": "09:00:00",
            "day_end": "12:00:00",
            "slot_minutes": 60,
            "break_minutes": 0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn booking_a_free_slot_succeeds_once(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let slot_id = seed_slot(&pool, &token).await;

    // Public booking succeeds.
    let body = expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/bookings",
            booking_payload(slot_id),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(body["data"]["slot_id"], slot_id);

    // The same slot cannot be booked twice.
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        booking_payload(slot_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The slot now reports as booked.
    let body = expect_status(
        get(build_test_app(pool), "/api/v1/booking-slots?free_only=true").await,
        StatusCode::OK,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancelling_frees_the_slot(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let slot_id = seed_slot(&pool, &token).await;

    let body = expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/bookings",
            booking_payload(slot_id),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let response = auth_post(
        build_test_app(pool.clone()),
        &format!("/api/v1/bookings/{booking_id}/cancel"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The freed slot can be booked again.
    let response = post_json(
        build_test_app(pool),
        "/api/v1/bookings",
        booking_payload(slot_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn booked_slots_cannot_be_deleted(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let slot_id = seed_slot(&pool, &token).await;

    expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/bookings",
            booking_payload(slot_id),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    let response = auth_delete(
        build_test_app(pool),
        &format!("/api/v1/booking-slots/{slot_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
