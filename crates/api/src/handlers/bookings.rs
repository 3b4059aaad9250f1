//! Handlers for the `/bookings` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::event_names;
use kontor_core::types::DbId;
use kontor_db::models::booking::CreateBooking;
use kontor_db::repositories::{BookingRepo, SlotRepo};
use kontor_events::OfficeEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bookings
pub async fn list_bookings(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let bookings = BookingRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// POST /api/v1/bookings
///
/// Book a free slot. Public: customers book without a login. The slot
/// is reserved atomically, so two concurrent requests for the same slot
/// cannot both succeed; the loser gets 409.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let slot = SlotRepo::find_by_id(&state.pool, input.slot_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BookingSlot",
            id: input.slot_id,
        }))?;

    if SlotRepo::reserve(&state.pool, slot.id).await?.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Slot is already booked".into(),
        )));
    }

    let booking = match BookingRepo::create(&state.pool, &input).await {
        Ok(booking) => booking,
        Err(e) => {
            // Undo the reservation so the slot is not stranded.
            SlotRepo::release(&state.pool, slot.id).await?;
            return Err(e.into());
        }
    };

    state.event_bus.publish(
        OfficeEvent::new(event_names::BOOKING_CREATED)
            .with_source("booking", booking.id)
            .with_payload(json!({ "slot_id": slot.id, "starts_at": slot.starts_at })),
    );

    tracing::info!(booking_id = booking.id, slot_id = slot.id, "Booking created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// POST /api/v1/bookings/{id}/cancel
///
/// Cancel a confirmed booking and free its slot. 409 when the booking
/// is already cancelled.
pub async fn cancel_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingRepo::find_by_id(&state.pool, booking_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id: booking_id,
        }))?;

    let cancelled = BookingRepo::cancel(&state.pool, booking_id).await?;
    if !cancelled {
        return Err(AppError::Core(CoreError::Conflict(
            "Booking is already cancelled".into(),
        )));
    }

    SlotRepo::release(&state.pool, booking.slot_id).await?;
    tracing::info!(booking_id, by = auth.user_id, "Booking cancelled");
    Ok(StatusCode::NO_CONTENT)
}
