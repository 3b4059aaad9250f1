//! Handlers for the `/emails` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Advisory
//! locks follow the cooperative model: holding the lock signals intent
//! to other operators, nothing is enforced on reads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use kontor_core::error::CoreError;
use kontor_core::event_names;
use kontor_core::types::DbId;
use kontor_db::models::email::{
    CreateEmail, Email, EmailListQuery, MoveEmail, ReplyEmail, UpdateEmail,
};
use kontor_db::repositories::{EmailRepo, MailboxRepo};
use kontor_events::OfficeEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_email(pool: &sqlx::PgPool, email_id: DbId) -> AppResult<Email> {
    EmailRepo::find_by_id(pool, email_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Email",
            id: email_id,
        }))
}

// ---------------------------------------------------------------------------
// List / get
// ---------------------------------------------------------------------------

/// GET /api/v1/emails
///
/// List emails, newest first. Supports `mailbox_id`, `unread_only`,
/// `search`, `limit`, and `offset` query parameters.
pub async fn list_emails(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EmailListQuery>,
) -> AppResult<impl IntoResponse> {
    let emails = EmailRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: emails }))
}

/// GET /api/v1/emails/unread-count
pub async fn unread_count(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = EmailRepo::unread_count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: json!({ "unread": count }),
    }))
}

/// GET /api/v1/emails/{id}
pub async fn get_email(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let email = find_email(&state.pool, email_id).await?;
    Ok(Json(DataResponse { data: email }))
}

// ---------------------------------------------------------------------------
// Intake / mutate
// ---------------------------------------------------------------------------

/// POST /api/v1/emails
///
/// Store an email in the inbox (manual intake). Returns 201 and
/// publishes `email.received` for the notification stream.
pub async fn create_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEmail>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let inbox = MailboxRepo::find_by_name(&state.pool, "inbox")
        .await?
        .ok_or_else(|| AppError::InternalError("Inbox mailbox missing from seed data".into()))?;
    let email = EmailRepo::create(&state.pool, inbox.id, &input).await?;

    state.event_bus.publish(
        OfficeEvent::new(event_names::EMAIL_RECEIVED)
            .with_source("email", email.id)
            .with_actor(auth.user_id)
            .with_payload(json!({ "subject": email.subject })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: email })))
}

/// PATCH /api/v1/emails/{id}
///
/// Update the read flag.
pub async fn update_email(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
    Json(input): Json<UpdateEmail>,
) -> AppResult<impl IntoResponse> {
    let Some(is_read) = input.is_read else {
        return Err(AppError::BadRequest("Nothing to update".into()));
    };

    let email = EmailRepo::mark_read(&state.pool, email_id, is_read)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Email",
            id: email_id,
        }))?;
    Ok(Json(DataResponse { data: email }))
}

/// POST /api/v1/emails/{id}/move
///
/// Move an email to another mailbox and publish `email.moved`.
pub async fn move_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
    Json(input): Json<MoveEmail>,
) -> AppResult<impl IntoResponse> {
    let mailbox = MailboxRepo::find_by_id(&state.pool, input.mailbox_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Mailbox",
            id: input.mailbox_id,
        }))?;

    let email = EmailRepo::move_to_mailbox(&state.pool, email_id, mailbox.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Email",
            id: email_id,
        }))?;

    state.event_bus.publish(
        OfficeEvent::new(event_names::EMAIL_MOVED)
            .with_source("email", email.id)
            .with_actor(auth.user_id)
            .with_payload(json!({ "mailbox_id": mailbox.id, "mailbox": mailbox.name })),
    );

    Ok(Json(DataResponse { data: email }))
}

/// DELETE /api/v1/emails/{id}
///
/// Soft delete: moves the email to the trash mailbox. Emails already in
/// trash are deleted permanently.
pub async fn delete_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let email = find_email(&state.pool, email_id).await?;
    let trash = MailboxRepo::find_by_name(&state.pool, "trash")
        .await?
        .ok_or_else(|| AppError::InternalError("Trash mailbox missing from seed data".into()))?;

    if email.mailbox_id == trash.id {
        EmailRepo::delete(&state.pool, email_id).await?;
        tracing::info!(email_id, by = auth.user_id, "Email permanently deleted");
        return Ok(StatusCode::NO_CONTENT);
    }

    EmailRepo::move_to_mailbox(&state.pool, email_id, trash.id).await?;
    state.event_bus.publish(
        OfficeEvent::new(event_names::EMAIL_MOVED)
            .with_source("email", email_id)
            .with_actor(auth.user_id)
            .with_payload(json!({ "mailbox_id": trash.id, "mailbox": "trash" })),
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Advisory lock
// ---------------------------------------------------------------------------

/// POST /api/v1/emails/{id}/lock
///
/// Take the advisory edit lock. 409 when another operator holds a
/// fresh lock.
pub async fn lock_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let locked = EmailRepo::try_lock(
        &state.pool,
        email_id,
        auth.user_id,
        state.config.lock_stale_mins,
    )
    .await?;

    match locked {
        Some(email) => {
            state.event_bus.publish(
                OfficeEvent::new(event_names::EMAIL_LOCKED)
                    .with_source("email", email_id)
                    .with_actor(auth.user_id),
            );
            Ok(Json(DataResponse { data: email }))
        }
        None => {
            // Distinguish "missing" from "held by someone else".
            let email = find_email(&state.pool, email_id).await?;
            Err(AppError::Core(CoreError::Conflict(format!(
                "Email is being edited by user {}",
                email.locked_by.unwrap_or_default()
            ))))
        }
    }
}

/// POST /api/v1/emails/{id}/unlock
///
/// Release the advisory lock. Admins may force-release another
/// operator's lock.
pub async fn unlock_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let unlocked =
        EmailRepo::unlock(&state.pool, email_id, auth.user_id, auth.is_admin()).await?;

    match unlocked {
        Some(email) => {
            state.event_bus.publish(
                OfficeEvent::new(event_names::EMAIL_UNLOCKED)
                    .with_source("email", email_id)
                    .with_actor(auth.user_id),
            );
            Ok(Json(DataResponse { data: email }))
        }
        None => {
            let _ = find_email(&state.pool, email_id).await?;
            Err(AppError::Core(CoreError::Conflict(
                "Lock is held by another user".into(),
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// POST /api/v1/emails/{id}/reply
///
/// Send a reply over SMTP, store the outbound copy in the archive, and
/// mark the original read.
pub async fn reply_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(email_id): Path<DbId>,
    Json(input): Json<ReplyEmail>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let original = find_email(&state.pool, email_id).await?;

    let subject = input
        .subject
        .clone()
        .unwrap_or_else(|| format!("Re: {}", original.subject));

    state
        .mailer
        .send(&original.from_address, &subject, &input.body)
        .await?;

    // Store the outbound copy so the thread is visible in the archive.
    let archive = MailboxRepo::find_by_name(&state.pool, "archive")
        .await?
        .ok_or_else(|| AppError::InternalError("Archive mailbox missing from seed data".into()))?;
    let copy = CreateEmail {
        from_address: state.mailer.from_address(),
        from_name: None,
        to_address: original.from_address.clone(),
        subject,
        body_text: input.body.clone(),
    };
    let stored = EmailRepo::create(&state.pool, archive.id, &copy).await?;
    EmailRepo::mark_read(&state.pool, email_id, true).await?;

    tracing::info!(email_id, reply_id = stored.id, by = auth.user_id, "Reply sent");
    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}
