//! Handlers for `/system`: detailed health and dashboard counters.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use kontor_db::repositories::{
    BookingRepo, ContactRequestRepo, EmailRepo, InvoiceRepo, NewsletterRepo,
};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Detailed health payload for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct SystemHealth {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_secs: u64,
    pub version: &'static str,
}

/// Stat-card counters for the dashboard landing page.
#[derive(Debug, Serialize)]
pub struct SystemStats {
    pub unread_emails: i64,
    pub open_contact_requests: i64,
    pub upcoming_bookings: i64,
    pub unpaid_invoices: i64,
    pub newsletter_subscribers: i64,
}

/// GET /api/v1/system/health
///
/// Authenticated health detail: DB reachability, uptime, version.
pub async fn system_health(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let database = match kontor_db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            "unreachable"
        }
    };

    let health = SystemHealth {
        status: if database == "ok" { "ok" } else { "degraded" },
        database,
        uptime_secs: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    };
    Ok(Json(DataResponse { data: health }))
}

/// GET /api/v1/system/stats
pub async fn system_stats(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = SystemStats {
        unread_emails: EmailRepo::unread_count(&state.pool).await?,
        open_contact_requests: ContactRequestRepo::open_count(&state.pool).await?,
        upcoming_bookings: BookingRepo::upcoming_count(&state.pool).await?,
        unpaid_invoices: InvoiceRepo::unpaid_count(&state.pool).await?,
        newsletter_subscribers: NewsletterRepo::count(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: stats }))
}
