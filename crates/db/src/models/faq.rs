//! FAQ entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `faq_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FaqEntry {
    pub id: DbId,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/faq`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFaq {
    #[validate(length(min = 5, max = 255))]
    pub question: String,
    #[validate(length(min = 1, max = 5000))]
    pub answer: String,
    pub position: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
}

/// DTO for `PUT /api/v1/faq/{id}`. All fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFaq {
    #[validate(length(min = 5, max = 255))]
    pub question: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub answer: Option<String>,
    pub position: Option<i32>,
    pub is_published: Option<bool>,
}
