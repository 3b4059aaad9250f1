//! Key/value settings rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::Timestamp;

/// Well-known setting key: `"true"` puts the public surface into
/// maintenance mode.
pub const SETTING_MAINTENANCE_MODE: &str = "maintenance_mode";

/// Well-known setting key: overrides the env-configured AI model at
/// startup.
pub const SETTING_AI_MODEL: &str = "ai_model";

/// A row from the `settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /api/v1/settings/{key}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSetting {
    #[validate(length(max = 10000))]
    pub value: String,
}
