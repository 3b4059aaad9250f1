//! Handlers for the admin `/ai-usage` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use kontor_db::models::ai_usage::AiUsageListQuery;
use kontor_db::repositories::AiUsageRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/ai-usage
///
/// List usage entries, newest first. Supports `purpose`, `limit`, and
/// `offset` query parameters.
pub async fn list_usage(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AiUsageListQuery>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("read AI usage")?;
    let entries = AiUsageRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/ai-usage/totals
pub async fn usage_totals(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("read AI usage")?;
    let totals = AiUsageRepo::totals(&state.pool).await?;
    Ok(Json(DataResponse { data: totals }))
}
