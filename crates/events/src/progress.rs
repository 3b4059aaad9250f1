//! Per-batch-job progress channels.
//!
//! The batch engine publishes [`BatchStreamEvent`]s for the job it is
//! running; each SSE subscriber holds its own `broadcast::Receiver`.
//! Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`
//! and shared across the application.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

use kontor_core::batch::BatchStreamEvent;
use kontor_core::types::DbId;

/// Buffer capacity per job channel. A lagging SSE subscriber misses
/// intermediate events but re-synchronizes from the next counter
/// snapshot, so a modest buffer is enough.
const CHANNEL_CAPACITY: usize = 256;

/// Registry of live progress channels, keyed by batch-job id.
///
/// A channel exists only while its job is running: the engine calls
/// [`open`](ProgressHub::open) before the first event and
/// [`close`](ProgressHub::close) after the terminal event. Subscribers
/// arriving after the close get `None` and fall back to a database
/// snapshot.
pub struct ProgressHub {
    channels: RwLock<HashMap<DbId, broadcast::Sender<BatchStreamEvent>>>,
}

impl ProgressHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Register a channel for a job about to run.
    pub async fn open(&self, job_id: DbId) {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        self.channels.write().await.insert(job_id, tx);
    }

    /// Subscribe to a running job's events.
    ///
    /// Returns `None` when the job has no live channel (not started, or
    /// already finished).
    pub async fn subscribe(
        &self,
        job_id: DbId,
    ) -> Option<broadcast::Receiver<BatchStreamEvent>> {
        self.channels
            .read()
            .await
            .get(&job_id)
            .map(|tx| tx.subscribe())
    }

    /// Publish an event for a job.
    ///
    /// Events for unknown jobs and events with zero subscribers are
    /// dropped silently; the database row stays authoritative either
    /// way.
    pub async fn publish(&self, job_id: DbId, event: BatchStreamEvent) {
        if let Some(tx) = self.channels.read().await.get(&job_id) {
            let _ = tx.send(event);
        }
    }

    /// Remove a finished job's channel. Receivers observe the channel
    /// closing after draining buffered events.
    pub async fn close(&self, job_id: DbId) {
        self.channels.write().await.remove(&job_id);
    }

    /// Number of live channels (i.e. running jobs with observers
    /// possible).
    pub async fn live_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(processed: i64) -> BatchStreamEvent {
        BatchStreamEvent::Progress {
            total: 5,
            processed,
            failed: 0,
            record: None,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let hub = ProgressHub::new();
        hub.open(1).await;

        let mut rx = hub.subscribe(1).await.expect("channel should exist");
        hub.publish(1, progress(1)).await;

        let event = rx.recv().await.expect("event should arrive");
        assert_eq!(event, progress(1));
    }

    #[tokio::test]
    async fn subscribe_to_unknown_job_returns_none() {
        let hub = ProgressHub::new();
        assert!(hub.subscribe(99).await.is_none());
    }

    #[tokio::test]
    async fn publish_to_unknown_job_is_a_no_op() {
        let hub = ProgressHub::new();
        // Must not panic or error.
        hub.publish(99, progress(1)).await;
    }

    #[tokio::test]
    async fn close_ends_the_stream_for_subscribers() {
        let hub = ProgressHub::new();
        hub.open(1).await;
        let mut rx = hub.subscribe(1).await.expect("channel should exist");

        hub.publish(1, BatchStreamEvent::Complete { total: 5, processed: 5, failed: 0 })
            .await;
        hub.close(1).await;

        // The buffered terminal event is still delivered...
        let event = rx.recv().await.expect("terminal event should arrive");
        assert!(event.is_terminal());
        // ...and the channel then reports closed.
        assert!(rx.recv().await.is_err());
        assert_eq!(hub.live_count().await, 0);
    }

    #[tokio::test]
    async fn channels_are_isolated_per_job() {
        let hub = ProgressHub::new();
        hub.open(1).await;
        hub.open(2).await;

        let mut rx1 = hub.subscribe(1).await.unwrap();
        let mut rx2 = hub.subscribe(2).await.unwrap();

        hub.publish(1, progress(3)).await;
        hub.publish(2, progress(4)).await;

        assert_eq!(rx1.recv().await.unwrap(), progress(3));
        assert_eq!(rx2.recv().await.unwrap(), progress(4));
    }
}
