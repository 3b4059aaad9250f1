//! Durable capture of bus events into the application log.

use tokio::sync::broadcast;

use kontor_db::repositories::LogRepo;
use kontor_db::DbPool;

use crate::bus::OfficeEvent;

/// Background service that writes every published [`OfficeEvent`] to
/// the `app_logs` table.
///
/// Spawned once at startup with its own bus subscription; exits when
/// the bus is dropped.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the capture loop until the bus closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<OfficeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let context = serde_json::json!({
                        "source_entity_type": event.source_entity_type,
                        "source_entity_id": event.source_entity_id,
                        "actor_user_id": event.actor_user_id,
                        "payload": event.payload,
                    });
                    if let Err(e) = LogRepo::append(
                        &pool,
                        "info",
                        "event_bus",
                        &event.event_type,
                        &context,
                    )
                    .await
                    {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event persistence lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }
}
