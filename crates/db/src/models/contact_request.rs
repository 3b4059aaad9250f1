//! Contact-request entity models and DTOs.
//!
//! The create payload is the one externally specified intake contract:
//! field lengths and formats here are load-bearing, and the partial
//! update is restricted to `is_processed` and `notes` (unknown fields
//! are rejected, not ignored).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

/// A row from the `contact_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactRequest {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub service_type: String,
    pub message: String,
    pub prefers_callback: bool,
    pub user_id: Option<DbId>,
    pub is_processed: bool,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for the public `POST /api/v1/contact-requests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(min = 2, max = 50))]
    pub service_type: String,
    #[validate(length(min = 10, max = 2000))]
    pub message: String,
    #[serde(default)]
    pub prefers_callback: bool,
    pub user_id: Option<DbId>,
}

/// DTO for `PATCH /api/v1/contact-requests/{id}`.
///
/// Deliberately closed: the intake fields are immutable after creation.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateContactRequest {
    pub is_processed: Option<bool>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query parameters for `GET /api/v1/contact-requests`.
#[derive(Debug, Deserialize)]
pub struct ContactRequestListQuery {
    /// Filter on processing state.
    pub is_processed: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateContactRequest {
        CreateContactRequest {
            name: "Erika Mustermann".into(),
            email: "erika@example.org".into(),
            phone_number: Some("+49301234567".into()),
            service_type: "beratung".into(),
            message: "Ich interessiere mich für einen Beratungstermin.".into(),
            prefers_callback: true,
            user_id: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        use validator::Validate;
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn short_name_rejected() {
        use validator::Validate;
        let mut req = valid_create();
        req.name = "E".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn bad_email_rejected() {
        use validator::Validate;
        let mut req = valid_create();
        req.email = "not-an-address".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn short_message_rejected() {
        use validator::Validate;
        let mut req = valid_create();
        req.message = "zu kurz".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn missing_phone_is_allowed() {
        use validator::Validate;
        let mut req = valid_create();
        req.phone_number = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_rejects_unknown_fields() {
        let result: Result<UpdateContactRequest, _> =
            serde_json::from_str(r#"{"is_processed":true,"name":"hijack"}"#);
        assert!(result.is_err(), "intake fields must not be updatable");
    }

    #[test]
    fn update_accepts_allowed_fields() {
        let update: UpdateContactRequest =
            serde_json::from_str(r#"{"is_processed":true,"notes":"erledigt"}"#).unwrap();
        assert_eq!(update.is_processed, Some(true));
        assert_eq!(update.notes.as_deref(), Some("erledigt"));
    }
}
