//! AI token-usage accounting rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `ai_usage` table: one entry per model call.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiUsageEntry {
    pub id: DbId,
    pub model: String,
    /// What the call was for, e.g. `"triage"`.
    pub purpose: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub email_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Aggregate totals for the usage dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiUsageTotals {
    pub calls: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
}

/// Query parameters for `GET /api/v1/ai-usage`.
#[derive(Debug, Deserialize)]
pub struct AiUsageListQuery {
    pub purpose: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
