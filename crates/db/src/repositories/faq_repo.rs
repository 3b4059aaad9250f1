//! Repository for the `faq_entries` table.

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::faq::{CreateFaq, FaqEntry, UpdateFaq};

const COLUMNS: &str = "id, question, answer, position, is_published, created_at, updated_at";

/// Provides CRUD operations for FAQ entries.
pub struct FaqRepo;

impl FaqRepo {
    /// Insert an entry. Without an explicit position it sorts last.
    pub async fn create(pool: &PgPool, input: &CreateFaq) -> Result<FaqEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO faq_entries (question, answer, position, is_published) \
             VALUES ($1, $2, \
                     COALESCE($3, (SELECT COALESCE(MAX(position), 0) + 1 FROM faq_entries)), \
                     $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FaqEntry>(&query)
            .bind(&input.question)
            .bind(&input.answer)
            .bind(input.position)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    /// List entries in display order. `published_only` hides drafts for
    /// the public endpoint.
    pub async fn list(pool: &PgPool, published_only: bool) -> Result<Vec<FaqEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM faq_entries \
             WHERE ($1 = false OR is_published = true) \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, FaqEntry>(&query)
            .bind(published_only)
            .fetch_all(pool)
            .await
    }

    /// Fetch an entry by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FaqEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM faq_entries WHERE id = $1");
        sqlx::query_as::<_, FaqEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update; absent fields keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFaq,
    ) -> Result<Option<FaqEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE faq_entries SET \
                 question = COALESCE($2, question), \
                 answer = COALESCE($3, answer), \
                 position = COALESCE($4, position), \
                 is_published = COALESCE($5, is_published), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FaqEntry>(&query)
            .bind(id)
            .bind(input.question.as_deref())
            .bind(input.answer.as_deref())
            .bind(input.position)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry. Returns whether a row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM faq_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
