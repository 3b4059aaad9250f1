//! Repository for the service catalog (`service_categories`,
//! `service_items`).

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::service::{
    CategoryWithItems, CreateCategory, CreateItem, ServiceCategory, ServiceItem, UpdateCategory,
    UpdateItem,
};

const CATEGORY_COLUMNS: &str = "id, name, description, position, created_at, updated_at";
const ITEM_COLUMNS: &str = "\
    id, category_id, name, description, price_cents, duration_minutes, \
    position, is_active, created_at, updated_at";

/// Provides CRUD operations for the service catalog.
pub struct ServiceRepo;

impl ServiceRepo {
    /// The public catalog: categories in display order, each with its
    /// active items.
    pub async fn catalog(pool: &PgPool) -> Result<Vec<CategoryWithItems>, sqlx::Error> {
        let categories = Self::list_categories(pool).await?;

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM service_items \
             WHERE is_active = true ORDER BY position, id"
        );
        let items = sqlx::query_as::<_, ServiceItem>(&query)
            .fetch_all(pool)
            .await?;

        let mut tree: Vec<CategoryWithItems> = categories
            .into_iter()
            .map(|category| CategoryWithItems {
                category,
                items: Vec::new(),
            })
            .collect();
        for item in items {
            if let Some(entry) = tree.iter_mut().find(|c| c.category.id == item.category_id) {
                entry.items.push(item);
            }
        }
        Ok(tree)
    }

    /// List all categories in display order.
    pub async fn list_categories(pool: &PgPool) -> Result<Vec<ServiceCategory>, sqlx::Error> {
        let query =
            format!("SELECT {CATEGORY_COLUMNS} FROM service_categories ORDER BY position, id");
        sqlx::query_as::<_, ServiceCategory>(&query)
            .fetch_all(pool)
            .await
    }

    /// Insert a category. Without an explicit position it sorts last.
    pub async fn create_category(
        pool: &PgPool,
        input: &CreateCategory,
    ) -> Result<ServiceCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_categories (name, description, position) \
             VALUES ($1, $2, \
                     COALESCE($3, (SELECT COALESCE(MAX(position), 0) + 1 FROM service_categories))) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceCategory>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial category update.
    pub async fn update_category(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<ServiceCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE service_categories SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 position = COALESCE($4, position), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceCategory>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category and (by cascade) its items.
    pub async fn delete_category(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert an item into a category.
    pub async fn create_item(pool: &PgPool, input: &CreateItem) -> Result<ServiceItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_items \
                 (category_id, name, description, price_cents, duration_minutes, position) \
             VALUES ($1, $2, $3, $4, $5, \
                     COALESCE($6, (SELECT COALESCE(MAX(position), 0) + 1 FROM service_items \
                                   WHERE category_id = $1))) \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceItem>(&query)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(input.price_cents)
            .bind(input.duration_minutes)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// Fetch an item by id.
    pub async fn find_item(pool: &PgPool, id: DbId) -> Result<Option<ServiceItem>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM service_items WHERE id = $1");
        sqlx::query_as::<_, ServiceItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial item update.
    pub async fn update_item(
        pool: &PgPool,
        id: DbId,
        input: &UpdateItem,
    ) -> Result<Option<ServiceItem>, sqlx::Error> {
        let query = format!(
            "UPDATE service_items SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price_cents = COALESCE($4, price_cents), \
                 duration_minutes = COALESCE($5, duration_minutes), \
                 position = COALESCE($6, position), \
                 is_active = COALESCE($7, is_active), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceItem>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.price_cents)
            .bind(input.duration_minutes)
            .bind(input.position)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item. Returns whether a row existed.
    pub async fn delete_item(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
