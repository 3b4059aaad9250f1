//! Repository for the `users` table.

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "\
    id, email, display_name, password_hash, role, is_active, \
    created_at, updated_at";

/// Provides CRUD operations for operator accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a pre-computed argon2 hash.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, display_name, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Fetch a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch an active user by login email.
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all users, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Apply a partial update; absent fields keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                 display_name = COALESCE($2, display_name), \
                 role = COALESCE($3, role), \
                 is_active = COALESCE($4, is_active), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.display_name.as_deref())
            .bind(input.role.as_deref())
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate an account. Returns whether a row was changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = false, updated_at = NOW() \
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
