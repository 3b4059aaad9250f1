//! Service-catalog entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `service_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `service_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceItem {
    pub id: DbId,
    pub category_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub duration_minutes: Option<i32>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category with its items, for the public catalog tree.
#[derive(Debug, Serialize)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: ServiceCategory,
    pub items: Vec<ServiceItem>,
}

/// DTO for `POST /api/v1/services/categories`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub position: Option<i32>,
}

/// DTO for `PUT /api/v1/services/categories/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub position: Option<i32>,
}

/// DTO for `POST /api/v1/services/items`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItem {
    pub category_id: DbId,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i32>,
    pub position: Option<i32>,
}

/// DTO for `PUT /api/v1/services/items/{id}`. All fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItem {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i32>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}
