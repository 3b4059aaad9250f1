//! Repository for the `contact_requests` table.

use sqlx::{PgPool, QueryBuilder};

use kontor_core::types::DbId;

use crate::models::contact_request::{
    ContactRequest, ContactRequestListQuery, CreateContactRequest, UpdateContactRequest,
};
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "\
    id, name, email, phone_number, service_type, message, prefers_callback, \
    user_id, is_processed, notes, created_at, updated_at";

/// Provides intake and triage operations for contact requests.
pub struct ContactRequestRepo;

impl ContactRequestRepo {
    /// Insert a new request from the public form.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContactRequest,
    ) -> Result<ContactRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_requests \
                 (name, email, phone_number, service_type, message, prefers_callback, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactRequest>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.phone_number.as_deref())
            .bind(&input.service_type)
            .bind(&input.message)
            .bind(input.prefers_callback)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// List requests, newest first, with an optional processed filter.
    pub async fn list(
        pool: &PgPool,
        params: &ContactRequestListQuery,
    ) -> Result<Vec<ContactRequest>, sqlx::Error> {
        let mut builder =
            QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {COLUMNS} FROM contact_requests WHERE 1=1"));

        if let Some(is_processed) = params.is_processed {
            builder.push(" AND is_processed = ").push_bind(is_processed);
        }
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(clamp_limit(params.limit))
            .push(" OFFSET ")
            .push_bind(clamp_offset(params.offset));

        builder
            .build_query_as::<ContactRequest>()
            .fetch_all(pool)
            .await
    }

    /// Fetch a request by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ContactRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contact_requests WHERE id = $1");
        sqlx::query_as::<_, ContactRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply the restricted partial update (`is_processed`, `notes`).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContactRequest,
    ) -> Result<Option<ContactRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE contact_requests SET \
                 is_processed = COALESCE($2, is_processed), \
                 notes = COALESCE($3, notes), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactRequest>(&query)
            .bind(id)
            .bind(input.is_processed)
            .bind(input.notes.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a request. Returns whether a row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count requests not yet processed.
    pub async fn open_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_requests WHERE is_processed = false")
            .fetch_one(pool)
            .await
    }
}
