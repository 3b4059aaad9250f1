//! Handlers for the admin-only `/admin/users` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::roles::{ROLE_ADMIN, ROLE_STAFF};
use kontor_core::types::DbId;
use kontor_db::models::user::{CreateUser, UpdateUser};
use kontor_db::repositories::UserRepo;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_role(role: &str) -> Result<(), AppError> {
    if role == ROLE_ADMIN || role == ROLE_STAFF {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown role '{role}', expected '{ROLE_ADMIN}' or '{ROLE_STAFF}'"
        )))
    }
}

/// GET /api/v1/admin/users
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("list users")?;
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/admin/users
///
/// Create an operator account. Returns 201 with the created user.
pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("create users")?;
    input.validate()?;
    validate_role(&input.role)?;

    let password_hash = hash_password(&input.password)?;
    let user = UserRepo::create(&state.pool, &input, &password_hash).await?;

    tracing::info!(user_id = user.id, by = auth.user_id, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("view users")?;
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("update users")?;
    input.validate()?;
    if let Some(role) = input.role.as_deref() {
        validate_role(role)?;
    }

    let user = UserRepo::update(&state.pool, user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    tracing::info!(user_id, by = auth.user_id, "User updated");
    Ok(Json(DataResponse { data: user }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Deactivates the account (soft delete); admins cannot deactivate
/// themselves.
pub async fn deactivate_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("deactivate users")?;
    if user_id == auth.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "You cannot deactivate your own account".into(),
        )));
    }

    let changed = UserRepo::deactivate(&state.pool, user_id).await?;
    if !changed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }

    tracing::info!(user_id, by = auth.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}
