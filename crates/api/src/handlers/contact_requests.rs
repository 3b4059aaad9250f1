//! Handlers for the `/contact-requests` resource.
//!
//! Creation is public (the website form posts here); everything else
//! requires authentication. The update contract is deliberately
//! restricted to `is_processed` and `notes`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::event_names;
use kontor_core::types::DbId;
use kontor_db::models::contact_request::{
    ContactRequestListQuery, CreateContactRequest, UpdateContactRequest,
};
use kontor_db::repositories::ContactRequestRepo;
use kontor_events::OfficeEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/contact-requests
///
/// Public intake endpoint with the validated contract. Returns 201 and
/// publishes `contact.created` for the operators' notification stream.
pub async fn create_contact_request(
    State(state): State<AppState>,
    Json(input): Json<CreateContactRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let request = ContactRequestRepo::create(&state.pool, &input).await?;

    state.event_bus.publish(
        OfficeEvent::new(event_names::CONTACT_CREATED)
            .with_source("contact_request", request.id)
            .with_payload(json!({ "service_type": request.service_type })),
    );

    tracing::info!(request_id = request.id, "Contact request received");
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/contact-requests
///
/// List requests, newest first. Supports `is_processed`, `limit`, and
/// `offset` query parameters.
pub async fn list_contact_requests(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ContactRequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = ContactRequestRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/contact-requests/{id}
pub async fn get_contact_request(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = ContactRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ContactRequest",
            id: request_id,
        }))?;
    Ok(Json(DataResponse { data: request }))
}

/// PATCH /api/v1/contact-requests/{id}
///
/// Partial update restricted to `is_processed` and `notes`; any other
/// field in the body is rejected at deserialization.
pub async fn update_contact_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<UpdateContactRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let request = ContactRequestRepo::update(&state.pool, request_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ContactRequest",
            id: request_id,
        }))?;

    tracing::info!(request_id, by = auth.user_id, "Contact request updated");
    Ok(Json(DataResponse { data: request }))
}

/// DELETE /api/v1/contact-requests/{id}
pub async fn delete_contact_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removed = ContactRequestRepo::delete(&state.pool, request_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ContactRequest",
            id: request_id,
        }));
    }

    tracing::info!(request_id, by = auth.user_id, "Contact request deleted");
    Ok(StatusCode::NO_CONTENT)
}
