//! Refresh-token session rows.

use sqlx::FromRow;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `sessions` table.
///
/// Only the SHA-256 digest of the refresh token is stored, so a database
/// leak does not compromise active sessions.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
