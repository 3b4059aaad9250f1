//! Handlers for the `/booking-slots` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use kontor_core::error::CoreError;
use kontor_core::slots::{generate_series, SlotSeriesSpec};
use kontor_core::types::DbId;
use kontor_db::models::slot::{CreateSlot, SlotListQuery};
use kontor_db::repositories::SlotRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/booking-slots
///
/// List slots in start order. Supports `from`, `to`, and `free_only`
/// query parameters. Public: the booking page needs free slots without
/// a login.
pub async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotListQuery>,
) -> AppResult<impl IntoResponse> {
    let slots = SlotRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// POST /api/v1/booking-slots
///
/// Create a single slot.
pub async fn create_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSlot>,
) -> AppResult<impl IntoResponse> {
    if input.ends_at <= input.starts_at {
        return Err(AppError::Core(CoreError::Validation(
            "Slot end must be after its start".into(),
        )));
    }

    let slot = SlotRepo::create(&state.pool, input.starts_at, input.ends_at).await?;
    tracing::info!(slot_id = slot.id, by = auth.user_id, "Slot created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// POST /api/v1/booking-slots/series
///
/// Generate a recurring series from day/time/duration parameters.
/// Drafts colliding with existing slots are skipped, so the operation
/// can be re-run with overlapping ranges.
pub async fn create_slot_series(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(spec): Json<SlotSeriesSpec>,
) -> AppResult<impl IntoResponse> {
    let drafts = generate_series(&spec)?;
    let slots = SlotRepo::create_series(&state.pool, &drafts).await?;

    tracing::info!(
        generated = drafts.len(),
        inserted = slots.len(),
        by = auth.user_id,
        "Slot series created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: slots })))
}

/// DELETE /api/v1/booking-slots/{id}
///
/// Delete a slot that was never booked; booked slots return 409.
pub async fn delete_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slot_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removed = SlotRepo::delete_unbooked(&state.pool, slot_id).await?;
    if !removed {
        // Either missing or booked; look it up to answer precisely.
        let slot = SlotRepo::find_by_id(&state.pool, slot_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "BookingSlot",
                id: slot_id,
            }))?;
        debug_assert!(slot.is_booked);
        return Err(AppError::Core(CoreError::Conflict(
            "Slot has a booking and cannot be deleted".into(),
        )));
    }

    tracing::info!(slot_id, by = auth.user_id, "Slot deleted");
    Ok(StatusCode::NO_CONTENT)
}
