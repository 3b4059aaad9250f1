//! Application log rows. Also the sink for persisted bus events.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `app_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppLog {
    pub id: DbId,
    /// `"info"`, `"warn"`, or `"error"`.
    pub level: String,
    /// Emitting subsystem or event type name.
    pub source: String,
    pub message: String,
    /// Free-form JSON context.
    pub context: serde_json::Value,
    pub created_at: Timestamp,
}

/// Query parameters for `GET /api/v1/logs`.
#[derive(Debug, Deserialize)]
pub struct LogListQuery {
    pub level: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
