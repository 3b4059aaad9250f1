//! HTTP-level tests for the `/contact-requests` endpoints: the public
//! intake contract and the restricted partial update.

mod common;

use axum::http::StatusCode;
use common::{
    auth_get, auth_patch_json, build_test_app, expect_status, get, post_json, seed_admin,
};
use serde_json::json;
use sqlx::PgPool;

fn valid_payload() -> serde_json::Value {
    json!({
        "name": "Erika Mustermann",
        "email": "erika@example.org",
        "service_type": "beratung",
        "message": "Ich interessiere mich für einen Beratungstermin nächste Woche.",
        "prefers_callback": true,
        "phone_number": "+49301234567"
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn public_create_succeeds_with_valid_payload(pool: PgPool) {
    let app = build_test_app(pool);
    let body = expect_status(
        post_json(app, "/api/v1/contact-requests", valid_payload()).await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(body["data"]["name"], "Erika Mustermann");
    assert_eq!(body["data"]["is_processed"], false);
    assert_eq!(body["data"]["prefers_callback"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_short_message(pool: PgPool) {
    let app = build_test_app(pool);
    let mut payload = valid_payload();
    payload["message"] = json!("zu kurz");

    let response = post_json(app, "/api/v1/contact-requests", payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_invalid_email(pool: PgPool) {
    let app = build_test_app(pool);
    let mut payload = valid_payload();
    payload["email"] = json!("keine-adresse");

    let response = post_json(app, "/api/v1/contact-requests", payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_requires_auth(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/contact-requests").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_filters_by_processed_flag(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;

    expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/contact-requests",
            valid_payload(),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    let body = expect_status(
        auth_get(
            build_test_app(pool.clone()),
            "/api/v1/contact-requests?is_processed=false",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let body = expect_status(
        auth_get(
            build_test_app(pool),
            "/api/v1/contact-requests?is_processed=true",
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_is_restricted_to_processed_and_notes(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;

    let created = expect_status(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/contact-requests",
            valid_payload(),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    // The allowed fields update fine.
    let body = expect_status(
        auth_patch_json(
            build_test_app(pool.clone()),
            &format!("/api/v1/contact-requests/{id}"),
            &token,
            json!({ "is_processed": true, "notes": "Rückruf erledigt" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["is_processed"], true);
    assert_eq!(body["data"]["notes"], "Rückruf erledigt");

    // Intake fields are rejected outright, not silently ignored.
    let response = auth_patch_json(
        build_test_app(pool),
        &format!("/api/v1/contact-requests/{id}"),
        &token,
        json!({ "name": "Umbenannt" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_of_missing_request_is_not_found(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;
    let app = build_test_app(pool);

    let response = auth_patch_json(
        app,
        "/api/v1/contact-requests/4711",
        &token,
        json!({ "is_processed": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
