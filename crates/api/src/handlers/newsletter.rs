//! Handlers for the `/newsletter` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use kontor_db::models::newsletter::{SendNewsletter, SendReport, SubscribeRequest};
use kontor_db::repositories::NewsletterRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/newsletter/subscribe
///
/// Public signup. Responds 201 whether or not the address was already
/// registered, so the endpoint does not leak the subscriber list.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(input): Json<SubscribeRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let subscriber = NewsletterRepo::subscribe(&state.pool, &input.email).await?;
    tracing::info!(subscriber_id = subscriber.id, "Newsletter subscription");
    Ok((StatusCode::CREATED, Json(DataResponse { data: subscriber })))
}

/// DELETE /api/v1/newsletter/unsubscribe/{token}
///
/// Public one-click unsubscribe via the token carried in every mail.
/// Always 204 so the link is idempotent.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    NewsletterRepo::unsubscribe(&state.pool, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/newsletter/subscribers
pub async fn list_subscribers(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("list newsletter subscribers")?;
    let subscribers = NewsletterRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: subscribers }))
}

/// POST /api/v1/newsletter/send
///
/// Fan a campaign out to all confirmed subscribers. Per-recipient SMTP
/// failures are counted, logged, and never abort the rest of the send.
pub async fn send_newsletter(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendNewsletter>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin("send the newsletter")?;
    input.validate()?;

    let recipients = NewsletterRepo::confirmed(&state.pool).await?;
    let mut sent: i64 = 0;
    let mut failed: i64 = 0;

    for subscriber in &recipients {
        match state
            .mailer
            .send(&subscriber.email, &input.subject, &input.body)
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    subscriber_id = subscriber.id,
                    error = %e,
                    "Newsletter delivery failed"
                );
            }
        }
    }

    let report = SendReport {
        recipients: recipients.len() as i64,
        sent,
        failed,
    };
    tracing::info!(
        recipients = report.recipients,
        sent,
        failed,
        by = auth.user_id,
        "Newsletter sent",
    );
    Ok(Json(DataResponse { data: report }))
}
