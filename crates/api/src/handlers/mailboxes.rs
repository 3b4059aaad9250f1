//! Handlers for the `/mailboxes` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use kontor_db::repositories::MailboxRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/mailboxes
///
/// Folder list with unread counts, in sidebar order.
pub async fn list_mailboxes(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mailboxes = MailboxRepo::list_with_unread(&state.pool).await?;
    Ok(Json(DataResponse { data: mailboxes }))
}
