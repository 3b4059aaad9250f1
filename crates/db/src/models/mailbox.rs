//! Mailbox (folder) entity models.

use serde::Serialize;
use sqlx::FromRow;

use kontor_core::types::DbId;

/// A row from the `mailboxes` table. Mailboxes are seeded by migration
/// (`inbox`, `archive`, `junk`, `trash`) and not user-creatable.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mailbox {
    pub id: DbId,
    /// Stable machine name, e.g. `"inbox"`.
    pub name: String,
    /// Human-readable label shown in the folder list.
    pub display_name: String,
    pub position: i32,
}

/// Mailbox with its unread email count, for the folder sidebar.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MailboxWithUnread {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub position: i32,
    pub unread_count: i64,
}
