//! Repository for the `bookings` table.

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::booking::{Booking, BookingWithSlot, CreateBooking};
use crate::models::status::BookingStatus;
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "\
    id, slot_id, customer_name, customer_email, customer_phone, note, \
    status_id, created_at, updated_at";

/// Provides CRUD operations for bookings.
pub struct BookingRepo;

impl BookingRepo {
    /// Insert a confirmed booking for a reserved slot.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBooking,
    ) -> Result<Booking, sqlx::Error> {
        let query = format!(
            "INSERT INTO bookings \
                 (slot_id, customer_name, customer_email, customer_phone, note, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(input.slot_id)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(input.customer_phone.as_deref())
            .bind(input.note.as_deref())
            .bind(BookingStatus::Confirmed.id())
            .fetch_one(pool)
            .await
    }

    /// List bookings joined with their slot times, upcoming first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<BookingWithSlot>, sqlx::Error> {
        sqlx::query_as::<_, BookingWithSlot>(
            "SELECT b.id, b.slot_id, b.customer_name, b.customer_email, \
                    b.customer_phone, b.note, b.status_id, \
                    s.starts_at, s.ends_at, b.created_at \
             FROM bookings b \
             JOIN booking_slots s ON s.id = b.slot_id \
             ORDER BY s.starts_at \
             LIMIT $1 OFFSET $2",
        )
        .bind(clamp_limit(limit))
        .bind(clamp_offset(offset))
        .fetch_all(pool)
        .await
    }

    /// Fetch a booking by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a confirmed booking cancelled. Returns whether a row changed.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bookings SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(BookingStatus::Cancelled.id())
        .bind(BookingStatus::Confirmed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count confirmed bookings with a slot starting after now.
    pub async fn upcoming_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings b \
             JOIN booking_slots s ON s.id = b.slot_id \
             WHERE b.status_id = $1 AND s.starts_at > NOW()",
        )
        .bind(BookingStatus::Confirmed.id())
        .fetch_one(pool)
        .await
    }
}
