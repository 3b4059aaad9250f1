//! Repository for the `batch_jobs` table.
//!
//! The row's counters are the authoritative progress of a run. Claiming
//! uses `FOR UPDATE SKIP LOCKED` so two engine instances can never pick
//! up the same pending job.

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::batch::BatchJob;
use crate::models::status::BatchStatus;

/// Column list for `batch_jobs` queries.
const COLUMNS: &str = "\
    id, status_id, total, processed, failed, error_message, \
    started_at, finished_at, created_at, updated_at";

/// Provides lifecycle operations for AI analysis batches.
pub struct BatchRepo;

impl BatchRepo {
    /// Create a pending batch over `total` queued items.
    pub async fn create(pool: &PgPool, total: i64) -> Result<BatchJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO batch_jobs (status_id, total) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BatchJob>(&query)
            .bind(BatchStatus::Pending.id())
            .bind(total)
            .fetch_one(pool)
            .await
    }

    /// Fetch a batch by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BatchJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM batch_jobs WHERE id = $1");
        sqlx::query_as::<_, BatchJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The currently pending or running batch, if any. At most one batch
    /// is active at a time (enforced by the start handler).
    pub async fn find_active(pool: &PgPool) -> Result<Option<BatchJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM batch_jobs \
             WHERE status_id IN ($1, $2) \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, BatchJob>(&query)
            .bind(BatchStatus::Pending.id())
            .bind(BatchStatus::Running.id())
            .fetch_optional(pool)
            .await
    }

    /// The most recent batch in any state, for status reporting when
    /// nothing is active.
    pub async fn find_latest(pool: &PgPool) -> Result<Option<BatchJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM batch_jobs ORDER BY id DESC LIMIT 1");
        sqlx::query_as::<_, BatchJob>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim a specific pending batch and mark it running.
    ///
    /// Returns `None` when the job was already claimed elsewhere.
    pub async fn claim(pool: &PgPool, id: DbId) -> Result<Option<BatchJob>, sqlx::Error> {
        let query = format!(
            "UPDATE batch_jobs \
             SET status_id = $2, started_at = NOW(), updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM batch_jobs \
                 WHERE id = $1 AND status_id = $3 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BatchJob>(&query)
            .bind(id)
            .bind(BatchStatus::Running.id())
            .bind(BatchStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Persist updated counters after one item was handled.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        processed: i64,
        failed: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE batch_jobs SET processed = $2, failed = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(processed)
        .bind(failed)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a batch completed with its final counters.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        processed: i64,
        failed: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE batch_jobs \
             SET status_id = $2, processed = $3, failed = $4, \
                 finished_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(BatchStatus::Completed.id())
        .bind(processed)
        .bind(failed)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a batch fatally failed.
    pub async fn fail(pool: &PgPool, id: DbId, error_message: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE batch_jobs \
             SET status_id = $2, error_message = $3, \
                 finished_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(BatchStatus::Failed.id())
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(())
    }
}
