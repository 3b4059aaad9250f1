//! Handlers for the `/invoices` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::types::DbId;
use kontor_db::models::invoice::{CreateInvoice, InvoiceListQuery, UpdateInvoice};
use kontor_db::repositories::InvoiceRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/invoices
///
/// List invoices, newest first. Supports `status_id`, `overdue_only`,
/// `limit`, and `offset` query parameters.
pub async fn list_invoices(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<InvoiceListQuery>,
) -> AppResult<impl IntoResponse> {
    let invoices = InvoiceRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: invoices }))
}

/// POST /api/v1/invoices
///
/// Create a draft invoice. Duplicate invoice numbers return 409.
pub async fn create_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInvoice>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let invoice = InvoiceRepo::create(&state.pool, &input).await?;
    tracing::info!(
        invoice_id = invoice.id,
        number = %invoice.invoice_number,
        by = auth.user_id,
        "Invoice created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: invoice })))
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let invoice = InvoiceRepo::find_by_id(&state.pool, invoice_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        }))?;
    Ok(Json(DataResponse { data: invoice }))
}

/// PUT /api/v1/invoices/{id}
pub async fn update_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
    Json(input): Json<UpdateInvoice>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let invoice = InvoiceRepo::update(&state.pool, invoice_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invoice",
            id: invoice_id,
        }))?;

    tracing::info!(invoice_id, by = auth.user_id, "Invoice updated");
    Ok(Json(DataResponse { data: invoice }))
}

/// POST /api/v1/invoices/{id}/mark-paid
///
/// 409 when the invoice is already paid.
pub async fn mark_invoice_paid(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let paid = InvoiceRepo::mark_paid(&state.pool, invoice_id).await?;
    match paid {
        Some(invoice) => {
            tracing::info!(invoice_id, by = auth.user_id, "Invoice marked paid");
            Ok(Json(DataResponse { data: invoice }))
        }
        None => {
            InvoiceRepo::find_by_id(&state.pool, invoice_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Invoice",
                    id: invoice_id,
                }))?;
            Err(AppError::Core(CoreError::Conflict(
                "Invoice is already paid".into(),
            )))
        }
    }
}

/// DELETE /api/v1/invoices/{id}
///
/// Only draft invoices can be deleted; issued invoices are records.
pub async fn delete_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removed = InvoiceRepo::delete_draft(&state.pool, invoice_id).await?;
    if !removed {
        InvoiceRepo::find_by_id(&state.pool, invoice_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Invoice",
                id: invoice_id,
            }))?;
        return Err(AppError::Core(CoreError::Conflict(
            "Only draft invoices can be deleted".into(),
        )));
    }

    tracing::info!(invoice_id, by = auth.user_id, "Invoice deleted");
    Ok(StatusCode::NO_CONTENT)
}
