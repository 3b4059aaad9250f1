//! Invoice entity models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use kontor_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `invoices` table. Amounts are integer cents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: DbId,
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount_cents: i64,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status_id: StatusId,
    pub issued_at: Timestamp,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/invoices`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoice {
    #[validate(length(min = 1, max = 50))]
    pub invoice_number: String,
    #[validate(length(min = 2, max = 100))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[validate(range(min = 1))]
    pub amount_cents: i64,
    pub due_date: NaiveDate,
}

/// DTO for `PUT /api/v1/invoices/{id}`. All fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoice {
    #[validate(length(min = 2, max = 100))]
    pub customer_name: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    #[validate(range(min = 1))]
    pub amount_cents: Option<i64>,
    pub due_date: Option<NaiveDate>,
    pub status_id: Option<StatusId>,
}

/// Query parameters for `GET /api/v1/invoices`.
#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    pub status_id: Option<StatusId>,
    /// Only invoices past their due date and not paid.
    #[serde(default)]
    pub overdue_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
