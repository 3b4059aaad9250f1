//! Repository for the seeded `mailboxes` table.

use sqlx::PgPool;

use kontor_core::types::DbId;

use crate::models::mailbox::{Mailbox, MailboxWithUnread};

const COLUMNS: &str = "id, name, display_name, position";

/// Lookup operations for mail folders. Mailboxes are seed data; there
/// are no create/delete operations.
pub struct MailboxRepo;

impl MailboxRepo {
    /// List all mailboxes with their unread counts, sidebar order.
    pub async fn list_with_unread(pool: &PgPool) -> Result<Vec<MailboxWithUnread>, sqlx::Error> {
        sqlx::query_as::<_, MailboxWithUnread>(
            "SELECT m.id, m.name, m.display_name, m.position, \
                    COUNT(e.id) FILTER (WHERE e.is_read = false) AS unread_count \
             FROM mailboxes m \
             LEFT JOIN emails e ON e.mailbox_id = m.id \
             GROUP BY m.id, m.name, m.display_name, m.position \
             ORDER BY m.position",
        )
        .fetch_all(pool)
        .await
    }

    /// Fetch a mailbox by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Mailbox>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mailboxes WHERE id = $1");
        sqlx::query_as::<_, Mailbox>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a mailbox by its stable machine name (e.g. `"trash"`).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Mailbox>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mailboxes WHERE name = $1");
        sqlx::query_as::<_, Mailbox>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
