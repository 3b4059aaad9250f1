//! Repository for the key/value `settings` table.

use sqlx::PgPool;

use crate::models::setting::Setting;

const COLUMNS: &str = "key, value, updated_at";

/// Provides access to application settings.
pub struct SettingRepo;

impl SettingRepo {
    /// List all settings.
    pub async fn list(pool: &PgPool) -> Result<Vec<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings ORDER BY key");
        sqlx::query_as::<_, Setting>(&query).fetch_all(pool).await
    }

    /// Fetch one setting by key.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE key = $1");
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite a setting.
    pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<Setting, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Setting>(&query)
            .bind(key)
            .bind(value)
            .fetch_one(pool)
            .await
    }
}
