//! Newsletter subscriber models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `newsletter_subscribers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub id: DbId,
    pub email: String,
    pub is_confirmed: bool,
    /// Opaque token carried in unsubscribe links.
    #[serde(skip_serializing)]
    pub unsubscribe_token: String,
    pub subscribed_at: Timestamp,
}

/// DTO for the public `POST /api/v1/newsletter/subscribe`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email)]
    pub email: String,
}

/// DTO for the admin `POST /api/v1/newsletter/send`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendNewsletter {
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1, max = 100000))]
    pub body: String,
}

/// Outcome of a newsletter fan-out, returned to the admin.
#[derive(Debug, Serialize)]
pub struct SendReport {
    pub recipients: i64,
    pub sent: i64,
    pub failed: i64,
}
