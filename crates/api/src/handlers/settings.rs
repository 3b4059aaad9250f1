//! Handlers for the `/settings` key/value resource.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use kontor_core::event_names;
use kontor_db::models::setting::{UpdateSetting, SETTING_MAINTENANCE_MODE};
use kontor_db::repositories::SettingRepo;
use kontor_events::OfficeEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn list_settings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("read settings")?;
    let settings = SettingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/v1/settings/{key}
pub async fn get_setting(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("read settings")?;
    let setting = SettingRepo::get(&state.pool, &key)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown setting '{key}'")))?;
    Ok(Json(DataResponse { data: setting }))
}

/// PUT /api/v1/settings/{key}
///
/// Upsert a setting. Changing the maintenance flag publishes
/// `system.maintenance` so open sessions react immediately.
pub async fn put_setting(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<UpdateSetting>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("change settings")?;
    input.validate()?;

    if key == SETTING_MAINTENANCE_MODE && input.value != "true" && input.value != "false" {
        return Err(AppError::BadRequest(
            "maintenance_mode must be 'true' or 'false'".into(),
        ));
    }

    let setting = SettingRepo::set(&state.pool, &key, &input.value).await?;

    if key == SETTING_MAINTENANCE_MODE {
        state.event_bus.publish(
            OfficeEvent::new(event_names::SYSTEM_MAINTENANCE)
                .with_actor(auth.user_id)
                .with_payload(json!({ "enabled": setting.value == "true" })),
        );
    }

    tracing::info!(%key, by = auth.user_id, "Setting changed");
    Ok(Json(DataResponse { data: setting }))
}
