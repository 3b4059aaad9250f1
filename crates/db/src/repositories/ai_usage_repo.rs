//! Repository for the `ai_usage` table.

use sqlx::{PgPool, QueryBuilder};

use kontor_core::types::DbId;

use crate::models::ai_usage::{AiUsageEntry, AiUsageListQuery, AiUsageTotals};
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "\
    id, model, purpose, prompt_tokens, completion_tokens, email_id, created_at";

/// Records and reports AI token consumption.
pub struct AiUsageRepo;

impl AiUsageRepo {
    /// Record one model call.
    pub async fn record(
        pool: &PgPool,
        model: &str,
        purpose: &str,
        prompt_tokens: i64,
        completion_tokens: i64,
        email_id: Option<DbId>,
    ) -> Result<AiUsageEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_usage (model, purpose, prompt_tokens, completion_tokens, email_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AiUsageEntry>(&query)
            .bind(model)
            .bind(purpose)
            .bind(prompt_tokens)
            .bind(completion_tokens)
            .bind(email_id)
            .fetch_one(pool)
            .await
    }

    /// List entries, newest first, optionally filtered by purpose.
    pub async fn list(
        pool: &PgPool,
        params: &AiUsageListQuery,
    ) -> Result<Vec<AiUsageEntry>, sqlx::Error> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {COLUMNS} FROM ai_usage WHERE 1=1"));

        if let Some(purpose) = params.purpose.as_deref() {
            builder.push(" AND purpose = ").push_bind(purpose.to_owned());
        }
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(clamp_limit(params.limit))
            .push(" OFFSET ")
            .push_bind(clamp_offset(params.offset));

        builder
            .build_query_as::<AiUsageEntry>()
            .fetch_all(pool)
            .await
    }

    /// Aggregate totals across all entries.
    pub async fn totals(pool: &PgPool) -> Result<AiUsageTotals, sqlx::Error> {
        sqlx::query_as::<_, AiUsageTotals>(
            "SELECT COUNT(*) AS calls, \
                    COALESCE(SUM(prompt_tokens), 0)::BIGINT AS prompt_tokens, \
                    COALESCE(SUM(completion_tokens), 0)::BIGINT AS completion_tokens \
             FROM ai_usage",
        )
        .fetch_one(pool)
        .await
    }
}
