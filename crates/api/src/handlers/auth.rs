//! Handlers for `/auth`: login, refresh-token rotation, logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use kontor_core::error::CoreError;
use kontor_db::models::user::{LoginRequest, RefreshRequest, User};
use kontor_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Token pair + account returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// POST /api/v1/auth/login
///
/// Verify credentials and issue an access/refresh token pair. Wrong
/// email and wrong password return the same 401 so the endpoint does
/// not leak which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_active_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| invalid_credentials())?;

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(invalid_credentials());
    }

    let response = issue_tokens(&state, user).await?;
    tracing::info!(user_id = response.user.id, "User logged in");
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Rotate a refresh token: the presented token is revoked and a new
/// pair is issued. An unknown or expired token yields 401.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<impl IntoResponse> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_valid(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Refresh token unknown or expired".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Account is deactivated".into()))
        })?;

    // Rotation: the old token must not work twice.
    SessionRepo::delete_by_hash(&state.pool, &token_hash).await?;

    let response = issue_tokens(&state, user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presented refresh token. Always 204, even for tokens that
/// were already gone.
pub async fn logout(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<impl IntoResponse> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    SessionRepo::delete_by_hash(&state.pool, &token_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

async fn issue_tokens(state: &AppState, user: User) -> AppResult<TokenResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Failed to sign access token: {e}")))?;

    let (refresh_token, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        user.id,
        &refresh_hash,
        state.config.jwt.refresh_token_expiry_days,
    )
    .await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        user,
    })
}
