//! Booking entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub slot_id: DbId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A booking joined with its slot times, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingWithSlot {
    pub id: DbId,
    pub slot_id: DbId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
    pub status_id: StatusId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/bookings`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBooking {
    pub slot_id: DbId,
    #[validate(length(min = 2, max = 100))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 7, max = 20))]
    pub customer_phone: Option<String>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}
