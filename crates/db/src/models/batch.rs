//! AI analysis batch-job rows.

use serde::Serialize;
use sqlx::FromRow;

use kontor_core::batch::BatchProgress;
use kontor_core::types::{DbId, Timestamp};

use super::status::{BatchStatus, StatusId};

/// A row from the `batch_jobs` table.
///
/// The counters on this row are the authoritative progress of the run;
/// stream events only mirror them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BatchJob {
    pub id: DbId,
    pub status_id: StatusId,
    pub total: i64,
    pub processed: i64,
    pub failed: i64,
    pub error_message: Option<String>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BatchJob {
    /// Whether the job has not yet reached a terminal state.
    pub fn is_processing(&self) -> bool {
        self.status_id == BatchStatus::Pending.id() || self.status_id == BatchStatus::Running.id()
    }

    /// Snapshot of the counters in the shared descriptor shape.
    pub fn progress(&self) -> BatchProgress {
        BatchProgress {
            total: self.total,
            processed: self.processed,
            failed: self.failed,
            is_processing: self.is_processing(),
        }
    }
}
