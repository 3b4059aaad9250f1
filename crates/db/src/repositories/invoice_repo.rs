//! Repository for the `invoices` table.

use sqlx::{PgPool, QueryBuilder};

use kontor_core::types::DbId;

use crate::models::invoice::{CreateInvoice, Invoice, InvoiceListQuery, UpdateInvoice};
use crate::models::status::InvoiceStatus;
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "\
    id, invoice_number, customer_name, customer_email, amount_cents, currency, \
    due_date, status_id, issued_at, paid_at, created_at, updated_at";

/// Provides CRUD operations for invoices.
pub struct InvoiceRepo;

impl InvoiceRepo {
    /// Insert a draft invoice.
    pub async fn create(pool: &PgPool, input: &CreateInvoice) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices \
                 (invoice_number, customer_name, customer_email, amount_cents, due_date, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(&input.invoice_number)
            .bind(&input.customer_name)
            .bind(&input.customer_email)
            .bind(input.amount_cents)
            .bind(input.due_date)
            .bind(InvoiceStatus::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// List invoices, newest first, with status/overdue filters.
    pub async fn list(
        pool: &PgPool,
        params: &InvoiceListQuery,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(format!("SELECT {COLUMNS} FROM invoices WHERE 1=1"));

        if let Some(status_id) = params.status_id {
            builder.push(" AND status_id = ").push_bind(status_id);
        }
        if params.overdue_only {
            builder
                .push(" AND due_date < CURRENT_DATE AND status_id <> ")
                .push_bind(InvoiceStatus::Paid.id());
        }
        builder
            .push(" ORDER BY issued_at DESC LIMIT ")
            .push_bind(clamp_limit(params.limit))
            .push(" OFFSET ")
            .push_bind(clamp_offset(params.offset));

        builder.build_query_as::<Invoice>().fetch_all(pool).await
    }

    /// Fetch an invoice by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update; absent fields keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInvoice,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET \
                 customer_name = COALESCE($2, customer_name), \
                 customer_email = COALESCE($3, customer_email), \
                 amount_cents = COALESCE($4, amount_cents), \
                 due_date = COALESCE($5, due_date), \
                 status_id = COALESCE($6, status_id), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(input.customer_name.as_deref())
            .bind(input.customer_email.as_deref())
            .bind(input.amount_cents)
            .bind(input.due_date)
            .bind(input.status_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark an invoice paid. Returns the updated row, `None` when the
    /// invoice does not exist or is already paid.
    pub async fn mark_paid(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!(
            "UPDATE invoices SET status_id = $2, paid_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id <> $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(InvoiceStatus::Paid.id())
            .fetch_optional(pool)
            .await
    }

    /// Delete a draft invoice. Sent/paid invoices are immutable records.
    pub async fn delete_draft(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND status_id = $2")
            .bind(id)
            .bind(InvoiceStatus::Draft.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count invoices that are due and unpaid.
    pub async fn unpaid_count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE status_id IN ($1, $2, $3)")
            .bind(InvoiceStatus::Draft.id())
            .bind(InvoiceStatus::Sent.id())
            .bind(InvoiceStatus::Overdue.id())
            .fetch_one(pool)
            .await
    }
}
