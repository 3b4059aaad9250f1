//! Email entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `emails` table.
///
/// AI triage fields (`ai_category`, `ai_summary`, `ai_suggested_reply`,
/// `analyzed_at`) are filled by the batch engine. The advisory lock
/// fields (`locked_by`, `locked_at`) prevent two operators from editing
/// the same email by convention, not by enforced exclusion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Email {
    pub id: DbId,
    pub mailbox_id: DbId,
    pub from_address: String,
    pub from_name: Option<String>,
    pub to_address: String,
    pub subject: String,
    pub body_text: String,
    pub received_at: Timestamp,
    pub is_read: bool,
    pub ai_category: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_suggested_reply: Option<String>,
    pub analyzed_at: Option<Timestamp>,
    pub locked_by: Option<DbId>,
    pub locked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Query parameters for `GET /api/v1/emails`.
#[derive(Debug, Deserialize)]
pub struct EmailListQuery {
    /// Restrict to one mailbox.
    pub mailbox_id: Option<DbId>,
    /// Only unread emails.
    #[serde(default)]
    pub unread_only: bool,
    /// Case-insensitive substring match on sender, subject, and body.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// DTO for storing a new email (manual intake and reply copies).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmail {
    #[validate(email)]
    pub from_address: String,
    #[validate(length(max = 100))]
    pub from_name: Option<String>,
    #[validate(email)]
    pub to_address: String,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body_text: String,
}

/// DTO for `PATCH /api/v1/emails/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateEmail {
    pub is_read: Option<bool>,
}

/// DTO for `POST /api/v1/emails/{id}/move`.
#[derive(Debug, Deserialize)]
pub struct MoveEmail {
    pub mailbox_id: DbId,
}

/// DTO for `POST /api/v1/emails/{id}/reply`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplyEmail {
    /// Overrides the default `Re: <subject>` when present.
    #[validate(length(min = 1, max = 255))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub body: String,
}

/// Result of an AI triage pass over one email.
#[derive(Debug, Clone)]
pub struct EmailAnalysis {
    pub category: String,
    pub summary: String,
    pub suggested_reply: String,
}
