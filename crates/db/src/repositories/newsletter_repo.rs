//! Repository for the `newsletter_subscribers` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::newsletter::Subscriber;
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, email, is_confirmed, unsubscribe_token, subscribed_at";

/// Provides subscribe/unsubscribe operations.
pub struct NewsletterRepo;

impl NewsletterRepo {
    /// Subscribe an address. Re-subscribing an existing address is a
    /// no-op that returns the existing row, so the public endpoint does
    /// not leak whether an address was already registered.
    pub async fn subscribe(pool: &PgPool, email: &str) -> Result<Subscriber, sqlx::Error> {
        let query = format!(
            "INSERT INTO newsletter_subscribers (email, unsubscribe_token) \
             VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_newsletter_subscribers_email \
                 DO UPDATE SET email = EXCLUDED.email \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(email)
            .bind(Uuid::new_v4().to_string())
            .fetch_one(pool)
            .await
    }

    /// Remove a subscriber by unsubscribe token. Returns whether a row
    /// was removed.
    pub async fn unsubscribe(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM newsletter_subscribers WHERE unsubscribe_token = $1")
                .bind(token)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List subscribers, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Subscriber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM newsletter_subscribers \
             ORDER BY subscribed_at DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// All confirmed recipients for a send.
    pub async fn confirmed(pool: &PgPool) -> Result<Vec<Subscriber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM newsletter_subscribers \
             WHERE is_confirmed = true ORDER BY id"
        );
        sqlx::query_as::<_, Subscriber>(&query).fetch_all(pool).await
    }

    /// Total subscriber count for the dashboard.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers")
            .fetch_one(pool)
            .await
    }
}
