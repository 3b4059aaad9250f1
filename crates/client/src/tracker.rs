//! Async driver for the observer state machine.
//!
//! [`ProgressTracker::spawn`] runs the machine against a live server:
//! it opens the SSE feed with reqwest, decodes frames, feeds them into
//! [`ObserverMachine`], and executes the returned effects (sleeps,
//! reconnects, status polls, the final authoritative refresh). Display
//! state is published on a `tokio::sync::watch` channel so any surface
//! can render counters and the activity log without touching the
//! machinery.

use std::collections::VecDeque;

use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::watch;

use kontor_core::batch::{BatchProgress, BatchStreamEvent};

use crate::backoff::ReconnectPolicy;
use crate::decode::SseDecoder;
use crate::machine::{Effect, Input, ObserverMachine, ObserverState};

/// Lines kept in the rolling activity log.
const ACTIVITY_LIMIT: usize = 50;

/// Connection settings for one observed batch.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Server base URL without a trailing slash, e.g.
    /// `http://localhost:3000`.
    pub base_url: String,
    /// JWT access token; sent as `?token=` on the stream and as a
    /// bearer header on REST calls.
    pub token: String,
    /// Reconnect schedule.
    pub policy: ReconnectPolicy,
}

/// Render-ready snapshot published after every machine step.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// Counters as last reported by the server.
    pub progress: Option<BatchProgress>,
    /// Current observer state label (`"streaming"`, `"polling"`, ...).
    pub phase: String,
    /// Rolling human-readable activity log, oldest first.
    pub activity: Vec<String>,
    /// Actionable failure notification, when the batch aborted.
    pub notice: Option<String>,
    /// Records merged from `progress` events plus the final refresh,
    /// keyed by `id`.
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    data: BatchProgress,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: Vec<serde_json::Value>,
}

/// Reconnecting observer for one batch run.
pub struct ProgressTracker {
    http: reqwest::Client,
    config: TrackerConfig,
    machine: ObserverMachine,
    display: watch::Sender<DisplayState>,
}

impl ProgressTracker {
    /// Start observing. Returns the display receiver; the tracker task
    /// ends once the machine reaches `Done`. Dropping it earlier just
    /// stops observing; the server-side batch is unaffected.
    pub fn spawn(config: TrackerConfig) -> (tokio::task::JoinHandle<()>, watch::Receiver<DisplayState>) {
        let (tx, rx) = watch::channel(DisplayState::default());
        let tracker = Self {
            http: reqwest::Client::new(),
            machine: ObserverMachine::new(config.policy.clone()),
            config,
            display: tx,
        };
        let handle = tokio::spawn(tracker.run());
        (handle, rx)
    }

    async fn run(mut self) {
        let mut queue: VecDeque<Effect> = self.step(Input::StartObserving).into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::OpenStream => {
                    let follow_ups = self.run_stream_session().await;
                    queue.extend(follow_ups);
                }
                Effect::Sleep(duration) => {
                    tokio::time::sleep(duration).await;
                    queue.extend(self.step(Input::SleepElapsed));
                }
                Effect::PollStatus => {
                    let input = self.poll_status().await;
                    queue.extend(self.step(input));
                }
                Effect::FetchFinalList => {
                    self.fetch_final_list().await;
                    queue.extend(self.step(Input::FinalListLoaded));
                }
                Effect::MergeRecord(record) => self.display.send_modify(|d| {
                    merge_record(&mut d.records, record);
                }),
                Effect::AppendActivity(line) => self.display.send_modify(|d| {
                    push_activity(&mut d.activity, line);
                }),
                Effect::NotifyFailure(message) => {
                    tracing::error!(%message, "Batch aborted");
                    self.display.send_modify(|d| d.notice = Some(message));
                }
            }
        }

        tracing::debug!("Tracker converged, task ending");
    }

    /// Feed one input into the machine and publish the new display
    /// snapshot.
    fn step(&mut self, input: Input) -> Vec<Effect> {
        let effects = self.machine.handle(input);
        let progress = self.machine.progress();
        let phase = self.machine.state().label();
        self.display.send_modify(|d| {
            d.progress = Some(progress);
            d.phase = phase;
        });
        effects
    }

    /// One streaming session: connect, decode, feed the machine until
    /// the transport drops or the machine finishes. Returns the queued
    /// follow-up effects.
    async fn run_stream_session(&mut self) -> Vec<Effect> {
        let url = format!(
            "{}/api/v1/emails/analysis/stream?token={}",
            self.config.base_url, self.config.token
        );

        let response = match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Stream request rejected");
                return self.step(Input::TransportClosed);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stream connection failed");
                return self.step(Input::TransportClosed);
            }
        };

        let mut follow_ups = self.step(Input::Opened);
        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!(error = %e, "Stream read error");
                    break;
                }
            };

            for frame in decoder.push(&String::from_utf8_lossy(&chunk)) {
                match serde_json::from_str::<BatchStreamEvent>(&frame.data) {
                    Ok(event) => {
                        let effects = self.step(Input::Event(event));
                        follow_ups.extend(self.split_display_effects(effects));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, raw = %frame.data, "Unparsable stream event");
                    }
                }
            }

            if self.machine.state() == ObserverState::Done {
                // Terminal event seen: stop reading, the server will
                // close the channel momentarily anyway.
                return follow_ups;
            }
        }

        // Transport ended without a terminal event: the job is still
        // running server-side, so recover.
        follow_ups.extend(self.step(Input::TransportClosed));
        follow_ups
    }

    /// Execute display-only effects inline; hand I/O effects back for
    /// the queue.
    fn split_display_effects(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut io = Vec::new();
        for effect in effects {
            match effect {
                Effect::MergeRecord(record) => self.display.send_modify(|d| {
                    merge_record(&mut d.records, record);
                }),
                Effect::AppendActivity(line) => self.display.send_modify(|d| {
                    push_activity(&mut d.activity, line);
                }),
                Effect::NotifyFailure(message) => {
                    tracing::error!(%message, "Batch aborted");
                    self.display.send_modify(|d| d.notice = Some(message));
                }
                other => io.push(other),
            }
        }
        io
    }

    /// Query the lightweight status endpoint.
    async fn poll_status(&self) -> Input {
        let url = format!("{}/api/v1/emails/analysis/status", self.config.base_url);
        let result = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<StatusEnvelope>().await {
                    Ok(envelope) => Input::PollResult(envelope.data),
                    Err(e) => {
                        tracing::warn!(error = %e, "Status response unparsable");
                        Input::PollFailed
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Status poll rejected");
                Input::PollFailed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status poll failed");
                Input::PollFailed
            }
        }
    }

    /// Refetch the authoritative list; streamed deltas are never
    /// trusted for final state.
    async fn fetch_final_list(&mut self) {
        let url = format!("{}/api/v1/emails", self.config.base_url);
        let result = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<ListEnvelope>().await {
                    Ok(envelope) => {
                        self.display.send_modify(|d| d.records = envelope.data);
                    }
                    Err(e) => tracing::warn!(error = %e, "Final list unparsable"),
                }
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Final list request rejected");
            }
            Err(e) => tracing::warn!(error = %e, "Final list request failed"),
        }
    }
}

/// Replace the record with a matching `id`, or append when unseen.
fn merge_record(records: &mut Vec<serde_json::Value>, record: serde_json::Value) {
    let id = record.get("id").cloned();
    match records
        .iter_mut()
        .find(|existing| id.is_some() && existing.get("id") == id.as_ref())
    {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

fn push_activity(activity: &mut Vec<String>, line: String) {
    activity.push(line);
    if activity.len() > ACTIVITY_LIMIT {
        let excess = activity.len() - ACTIVITY_LIMIT;
        activity.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_replaces_matching_id() {
        let mut records = vec![json!({ "id": 1, "subject": "alt" })];
        merge_record(&mut records, json!({ "id": 1, "subject": "neu" }));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["subject"], "neu");
    }

    #[test]
    fn merge_appends_unknown_id() {
        let mut records = vec![json!({ "id": 1 })];
        merge_record(&mut records, json!({ "id": 2 }));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn merge_without_id_appends() {
        let mut records = vec![json!({ "id": 1 })];
        merge_record(&mut records, json!({ "subject": "anon" }));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn activity_log_is_bounded() {
        let mut activity = Vec::new();
        for n in 0..(ACTIVITY_LIMIT + 10) {
            push_activity(&mut activity, format!("line {n}"));
        }
        assert_eq!(activity.len(), ACTIVITY_LIMIT);
        assert_eq!(activity.first().unwrap(), "line 10");
        assert_eq!(activity.last().unwrap(), &format!("line {}", ACTIVITY_LIMIT + 9));
    }
}
