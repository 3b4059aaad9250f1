//! Handlers for the admin `/ai-config` resource.
//!
//! The API key itself never leaves the environment; this surface only
//! exposes the non-secret parts and lets an admin pin a different
//! model. The override is stored in settings and applied at the next
//! startup, where `main` reads it before building the AI client.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use kontor_db::models::setting::SETTING_AI_MODEL;
use kontor_db::repositories::SettingRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Non-secret view of the AI configuration.
#[derive(Debug, Serialize)]
pub struct AiConfigView {
    /// Model the running server is using.
    pub active_model: String,
    /// Stored override, when one is set (takes effect on restart).
    pub model_override: Option<String>,
}

/// DTO for `PUT /api/v1/ai-config`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAiConfig {
    #[validate(length(min = 1, max = 100))]
    pub model: String,
}

/// GET /api/v1/ai-config
pub async fn get_ai_config(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("read the AI configuration")?;

    let stored = SettingRepo::get(&state.pool, SETTING_AI_MODEL).await?;
    let view = AiConfigView {
        active_model: state.ai.model().to_string(),
        model_override: stored.map(|s| s.value),
    };
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/ai-config
///
/// Store a model override; the running server keeps its current model
/// until restart.
pub async fn put_ai_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateAiConfig>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("change the AI configuration")?;
    input.validate()?;

    SettingRepo::set(&state.pool, SETTING_AI_MODEL, &input.model).await?;
    tracing::info!(model = %input.model, by = auth.user_id, "AI model override stored");

    let view = AiConfigView {
        active_model: state.ai.model().to_string(),
        model_override: Some(input.model),
    };
    Ok(Json(DataResponse { data: view }))
}
