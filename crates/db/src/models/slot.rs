//! Booking-slot entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `booking_slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingSlot {
    pub id: DbId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_booked: bool,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/booking-slots`.
#[derive(Debug, Deserialize)]
pub struct CreateSlot {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

/// Query parameters for `GET /api/v1/booking-slots`.
#[derive(Debug, Deserialize)]
pub struct SlotListQuery {
    /// Only slots starting at or after this instant.
    pub from: Option<Timestamp>,
    /// Only slots starting before this instant.
    pub to: Option<Timestamp>,
    /// Only slots that are still free.
    #[serde(default)]
    pub free_only: bool,
}
