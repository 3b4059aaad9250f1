//! Handlers for the `/services` catalog: public tree, admin CRUD for
//! categories and items.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::types::DbId;
use kontor_db::models::service::{CreateCategory, CreateItem, UpdateCategory, UpdateItem};
use kontor_db::repositories::ServiceRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/services
///
/// Public catalog: categories in display order with their active items.
pub async fn catalog(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = ServiceRepo::catalog(&state.pool).await?;
    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/services/categories
pub async fn list_categories(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;
    let categories = ServiceRepo::list_categories(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/services/categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;
    input.validate()?;

    let category = ServiceRepo::create_category(&state.pool, &input).await?;
    tracing::info!(category_id = category.id, by = auth.user_id, "Category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/services/categories/{id}
pub async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;
    input.validate()?;

    let category = ServiceRepo::update_category(&state.pool, category_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceCategory",
            id: category_id,
        }))?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/services/categories/{id}
///
/// Removes the category and, by cascade, its items.
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;

    let removed = ServiceRepo::delete_category(&state.pool, category_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ServiceCategory",
            id: category_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// POST /api/v1/services/items
pub async fn create_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateItem>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;
    input.validate()?;

    // A clear 404 beats a foreign-key violation.
    ServiceRepo::list_categories(&state.pool)
        .await?
        .iter()
        .find(|c| c.id == input.category_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceCategory",
            id: input.category_id,
        }))?;

    let item = ServiceRepo::create_item(&state.pool, &input).await?;
    tracing::info!(item_id = item.id, by = auth.user_id, "Service item created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/services/items/{id}
pub async fn update_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<UpdateItem>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;
    input.validate()?;

    let item = ServiceRepo::update_item(&state.pool, item_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceItem",
            id: item_id,
        }))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/services/items/{id}
pub async fn delete_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("manage the service catalog")?;

    let removed = ServiceRepo::delete_item(&state.pool, item_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ServiceItem",
            id: item_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
