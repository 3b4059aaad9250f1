//! Repository for the `sessions` table (refresh-token digests).

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::session::Session;

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, created_at";

/// Provides refresh-token session storage.
pub struct SessionRepo;

impl SessionRepo {
    /// Store a refresh-token digest valid for `expiry_days`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        expiry_days: i64,
    ) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, expires_at) \
             VALUES ($1, $2, NOW() + make_interval(days => $3::int)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expiry_days as i32)
            .fetch_one(pool)
            .await
    }

    /// Look up a non-expired session by token digest.
    pub async fn find_valid(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions \
             WHERE refresh_token_hash = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete a session by token digest (logout / rotation).
    pub async fn delete_by_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove all expired sessions; returns the number removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
