//! Repository for the `app_logs` table.

use sqlx::{PgPool, QueryBuilder};

use crate::models::app_log::{AppLog, LogListQuery};
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, level, source, message, context, created_at";

/// Provides write and query access to the application log.
pub struct LogRepo;

impl LogRepo {
    /// Append a log row.
    pub async fn append(
        pool: &PgPool,
        level: &str,
        source: &str,
        message: &str,
        context: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO app_logs (level, source, message, context) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(level)
        .bind(source)
        .bind(message)
        .bind(context)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List log rows, newest first, with level/source filters.
    pub async fn list(pool: &PgPool, params: &LogListQuery) -> Result<Vec<AppLog>, sqlx::Error> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {COLUMNS} FROM app_logs WHERE 1=1"));

        if let Some(level) = params.level.as_deref() {
            builder.push(" AND level = ").push_bind(level.to_owned());
        }
        if let Some(source) = params.source.as_deref() {
            builder.push(" AND source = ").push_bind(source.to_owned());
        }
        builder
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(clamp_limit(params.limit))
            .push(" OFFSET ")
            .push_bind(clamp_offset(params.offset));

        builder.build_query_as::<AppLog>().fetch_all(pool).await
    }

    /// Delete log rows older than `days` days; returns the number
    /// removed.
    pub async fn trim_older_than(pool: &PgPool, days: i32) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM app_logs WHERE created_at < NOW() - make_interval(days => $1)")
                .bind(days)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
