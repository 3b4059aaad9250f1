//! Repository for the `emails` table.
//!
//! Advisory locks are cooperative: `try_lock` succeeds when the email is
//! unlocked, already held by the caller, or the previous holder's lock
//! has gone stale. Nothing here prevents reads.

use sqlx::{PgPool, QueryBuilder};

use kontor_core::types::DbId;

use crate::models::email::{CreateEmail, Email, EmailAnalysis, EmailListQuery};
use crate::repositories::{clamp_limit, clamp_offset};

/// Column list for `emails` queries.
const COLUMNS: &str = "\
    id, mailbox_id, from_address, from_name, to_address, subject, body_text, \
    received_at, is_read, ai_category, ai_summary, ai_suggested_reply, \
    analyzed_at, locked_by, locked_at, created_at, updated_at";

/// Provides CRUD, lock, and triage operations for emails.
pub struct EmailRepo;

impl EmailRepo {
    /// Insert an email (manual intake, reply copies, tests).
    pub async fn create(
        pool: &PgPool,
        mailbox_id: DbId,
        input: &CreateEmail,
    ) -> Result<Email, sqlx::Error> {
        let query = format!(
            "INSERT INTO emails \
                 (mailbox_id, from_address, from_name, to_address, subject, body_text, received_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(mailbox_id)
            .bind(&input.from_address)
            .bind(input.from_name.as_deref())
            .bind(&input.to_address)
            .bind(&input.subject)
            .bind(&input.body_text)
            .fetch_one(pool)
            .await
    }

    /// List emails, newest first, with optional mailbox/unread/search
    /// filters and clamped paging.
    pub async fn list(pool: &PgPool, params: &EmailListQuery) -> Result<Vec<Email>, sqlx::Error> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {COLUMNS} FROM emails WHERE 1=1"));

        if let Some(mailbox_id) = params.mailbox_id {
            builder.push(" AND mailbox_id = ").push_bind(mailbox_id);
        }
        if params.unread_only {
            builder.push(" AND is_read = false");
        }
        if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            builder
                .push(" AND (from_address ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR subject ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR body_text ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder
            .push(" ORDER BY received_at DESC LIMIT ")
            .push_bind(clamp_limit(params.limit))
            .push(" OFFSET ")
            .push_bind(clamp_offset(params.offset));

        builder.build_query_as::<Email>().fetch_all(pool).await
    }

    /// Fetch an email by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Email>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM emails WHERE id = $1");
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the read flag.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        is_read: bool,
    ) -> Result<Option<Email>, sqlx::Error> {
        let query = format!(
            "UPDATE emails SET is_read = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .bind(is_read)
            .fetch_optional(pool)
            .await
    }

    /// Move an email to another mailbox.
    pub async fn move_to_mailbox(
        pool: &PgPool,
        id: DbId,
        mailbox_id: DbId,
    ) -> Result<Option<Email>, sqlx::Error> {
        let query = format!(
            "UPDATE emails SET mailbox_id = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .bind(mailbox_id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an email row. Returns whether a row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM emails WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Try to take the advisory edit lock for `user_id`.
    ///
    /// Succeeds when the email is unlocked, already held by the caller,
    /// or the current lock is older than `stale_after_mins`. Returns the
    /// updated row on success, `None` when the email exists but is held
    /// by someone else (the caller maps that to a conflict).
    pub async fn try_lock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        stale_after_mins: i32,
    ) -> Result<Option<Email>, sqlx::Error> {
        let query = format!(
            "UPDATE emails SET locked_by = $2, locked_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND ( \
                 locked_by IS NULL \
                 OR locked_by = $2 \
                 OR locked_at < NOW() - make_interval(mins => $3) \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .bind(user_id)
            .bind(stale_after_mins)
            .fetch_optional(pool)
            .await
    }

    /// Release the advisory lock if held by `user_id`, or held by
    /// anyone when `force` is set (admin override).
    pub async fn unlock(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        force: bool,
    ) -> Result<Option<Email>, sqlx::Error> {
        let query = format!(
            "UPDATE emails SET locked_by = NULL, locked_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND (locked_by = $2 OR $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .bind(user_id)
            .bind(force)
            .fetch_optional(pool)
            .await
    }

    /// All emails not yet analyzed, oldest first (the batch queue).
    pub async fn list_unanalyzed(pool: &PgPool) -> Result<Vec<Email>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM emails \
             WHERE analyzed_at IS NULL \
             ORDER BY received_at ASC"
        );
        sqlx::query_as::<_, Email>(&query).fetch_all(pool).await
    }

    /// Number of emails waiting for analysis.
    pub async fn count_unanalyzed(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM emails WHERE analyzed_at IS NULL")
            .fetch_one(pool)
            .await
    }

    /// Store the triage result for one email.
    pub async fn apply_analysis(
        pool: &PgPool,
        id: DbId,
        analysis: &EmailAnalysis,
    ) -> Result<Option<Email>, sqlx::Error> {
        let query = format!(
            "UPDATE emails SET \
                 ai_category = $2, ai_summary = $3, ai_suggested_reply = $4, \
                 analyzed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(id)
            .bind(&analysis.category)
            .bind(&analysis.summary)
            .bind(&analysis.suggested_reply)
            .fetch_optional(pool)
            .await
    }

    /// Total unread count across all mailboxes.
    pub async fn unread_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM emails WHERE is_read = false")
            .fetch_one(pool)
            .await
    }
}
