//! Handlers for the `/faq` resource: public published list, admin CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::types::DbId;
use kontor_db::models::faq::{CreateFaq, UpdateFaq};
use kontor_db::repositories::FaqRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/faq
///
/// Public list of published entries in display order.
pub async fn list_published(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let entries = FaqRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/faq/all
///
/// Admin list including drafts.
pub async fn list_all(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("list FAQ drafts")?;
    let entries = FaqRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/faq
pub async fn create_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFaq>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("create FAQ entries")?;
    input.validate()?;

    let entry = FaqRepo::create(&state.pool, &input).await?;
    tracing::info!(entry_id = entry.id, by = auth.user_id, "FAQ entry created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// PUT /api/v1/faq/{id}
pub async fn update_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    Json(input): Json<UpdateFaq>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("update FAQ entries")?;
    input.validate()?;

    let entry = FaqRepo::update(&state.pool, entry_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FaqEntry",
            id: entry_id,
        }))?;
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/faq/{id}
pub async fn delete_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("delete FAQ entries")?;

    let removed = FaqRepo::delete(&state.pool, entry_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "FaqEntry",
            id: entry_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
