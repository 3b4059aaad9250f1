//! Handlers for the admin `/logs` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use kontor_db::models::app_log::LogListQuery;
use kontor_db::repositories::LogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/logs
///
/// List log rows, newest first. Supports `level`, `source`, `limit`,
/// and `offset` query parameters.
pub async fn list_logs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<LogListQuery>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("read the application log")?;
    let logs = LogRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// Query parameters for the retention trim.
#[derive(Debug, Deserialize)]
pub struct TrimParams {
    /// Delete rows older than this many days (default: 90).
    pub older_than_days: Option<i32>,
}

/// POST /api/v1/logs/trim
///
/// Delete rows past the retention window; returns the removed count.
pub async fn trim_logs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrimParams>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("trim the application log")?;

    let days = params.older_than_days.unwrap_or(90);
    if days < 1 {
        return Err(AppError::BadRequest(
            "older_than_days must be at least 1".into(),
        ));
    }

    let removed = LogRepo::trim_older_than(&state.pool, days).await?;
    tracing::info!(removed, days, by = auth.user_id, "Log retention trim");
    Ok(Json(DataResponse {
        data: json!({ "removed": removed }),
    }))
}
