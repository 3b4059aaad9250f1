//! Repository for the `booking_slots` table.

use sqlx::{PgPool, QueryBuilder};

use kontor_core::slots::SlotDraft;
use kontor_core::types::{DbId, Timestamp};

use crate::models::slot::{BookingSlot, SlotListQuery};

const COLUMNS: &str = "id, starts_at, ends_at, is_booked, created_at";

/// Provides CRUD operations for bookable time slots.
pub struct SlotRepo;

impl SlotRepo {
    /// Insert a single slot.
    pub async fn create(
        pool: &PgPool,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Result<BookingSlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO booking_slots (starts_at, ends_at) \
             VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingSlot>(&query)
            .bind(starts_at)
            .bind(ends_at)
            .fetch_one(pool)
            .await
    }

    /// Insert a generated series, skipping drafts whose start time
    /// already has a slot. Returns the inserted rows.
    pub async fn create_series(
        pool: &PgPool,
        drafts: &[SlotDraft],
    ) -> Result<Vec<BookingSlot>, sqlx::Error> {
        let mut inserted = Vec::with_capacity(drafts.len());
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO booking_slots (starts_at, ends_at) \
             VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_booking_slots_starts_at DO NOTHING \
             RETURNING {COLUMNS}"
        );
        for draft in drafts {
            let row = sqlx::query_as::<_, BookingSlot>(&query)
                .bind(draft.starts_at)
                .bind(draft.ends_at)
                .fetch_optional(&mut *tx)
                .await?;
            if let Some(slot) = row {
                inserted.push(slot);
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// List slots in start order with optional range and free filters.
    pub async fn list(
        pool: &PgPool,
        params: &SlotListQuery,
    ) -> Result<Vec<BookingSlot>, sqlx::Error> {
        let mut builder =
            QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {COLUMNS} FROM booking_slots WHERE 1=1"));

        if let Some(from) = params.from {
            builder.push(" AND starts_at >= ").push_bind(from);
        }
        if let Some(to) = params.to {
            builder.push(" AND starts_at < ").push_bind(to);
        }
        if params.free_only {
            builder.push(" AND is_booked = false");
        }
        builder.push(" ORDER BY starts_at");

        builder
            .build_query_as::<BookingSlot>()
            .fetch_all(pool)
            .await
    }

    /// Fetch a slot by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BookingSlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM booking_slots WHERE id = $1");
        sqlx::query_as::<_, BookingSlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically mark a free slot as booked. Returns `None` when the
    /// slot is already taken (the caller maps that to a conflict).
    pub async fn reserve(pool: &PgPool, id: DbId) -> Result<Option<BookingSlot>, sqlx::Error> {
        let query = format!(
            "UPDATE booking_slots SET is_booked = true \
             WHERE id = $1 AND is_booked = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingSlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Free a slot again after its booking was cancelled.
    pub async fn release(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE booking_slots SET is_booked = false WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a slot that has never been booked. Returns whether a row
    /// was removed.
    pub async fn delete_unbooked(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM booking_slots WHERE id = $1 AND is_booked = false")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
