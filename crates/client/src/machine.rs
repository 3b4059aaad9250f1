//! The pure observer state machine.
//!
//! [`ObserverMachine::handle`] maps an [`Input`] to a list of
//! [`Effect`]s without performing any I/O, so the whole reconnect /
//! fallback behaviour is testable as plain function calls. The driver
//! in [`tracker`](crate::tracker) executes the effects.
//!
//! Counter discipline: every counter-bearing event (`start`,
//! `reconnect`, `progress`, `complete`, poll results) REPLACES the
//! local counters. The machine never adds deltas, so reconnecting
//! mid-job cannot double-count.

use std::time::Duration;

use kontor_core::batch::{BatchProgress, BatchStreamEvent, StepPhase};

use crate::backoff::{ReconnectPolicy, POLL_INTERVAL};

// ---------------------------------------------------------------------------
// States, inputs, effects
// ---------------------------------------------------------------------------

/// Named observer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    /// Not observing anything yet.
    Idle,
    /// A stream request is in flight.
    Connecting,
    /// Receiving live events.
    Streaming,
    /// Waiting out the backoff delay before reconnect `attempt`.
    Reconnecting { attempt: u32 },
    /// Stream abandoned; polling the status endpoint.
    Polling,
    /// Converged on the server's terminal state.
    Done,
}

impl ObserverState {
    /// Short label for display surfaces.
    pub fn label(&self) -> String {
        match self {
            Self::Idle => "idle".into(),
            Self::Connecting => "connecting".into(),
            Self::Streaming => "streaming".into(),
            Self::Reconnecting { attempt } => format!("reconnecting (attempt {attempt})"),
            Self::Polling => "polling".into(),
            Self::Done => "done".into(),
        }
    }
}

/// Everything the outside world can tell the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Begin observing (from `Idle`).
    StartObserving,
    /// The stream request connected.
    Opened,
    /// A decoded stream event arrived.
    Event(BatchStreamEvent),
    /// The transport dropped without a terminal event.
    TransportClosed,
    /// A requested sleep (backoff or poll pause) elapsed.
    SleepElapsed,
    /// The status endpoint answered.
    PollResult(BatchProgress),
    /// The status endpoint was unreachable; polling continues.
    PollFailed,
    /// The authoritative list refresh finished.
    FinalListLoaded,
}

/// I/O the driver must perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open (or reopen) the SSE stream.
    OpenStream,
    /// Sleep, then feed [`Input::SleepElapsed`] back in.
    Sleep(Duration),
    /// Query the lightweight status endpoint.
    PollStatus,
    /// Refetch the authoritative email list; the streamed deltas are
    /// never trusted for final state.
    FetchFinalList,
    /// Merge an updated record into the in-memory list by id.
    MergeRecord(serde_json::Value),
    /// Append a line to the human-readable activity log.
    AppendActivity(String),
    /// Surface an actionable failure notification to the user.
    NotifyFailure(String),
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Pure reconnecting observer. See the module docs for the contract.
#[derive(Debug)]
pub struct ObserverMachine {
    state: ObserverState,
    progress: BatchProgress,
    policy: ReconnectPolicy,
    /// Failed connection attempts since the last successful open.
    attempts: u32,
}

impl ObserverMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ObserverState::Idle,
            progress: BatchProgress {
                total: 0,
                processed: 0,
                failed: 0,
                is_processing: false,
            },
            policy,
            attempts: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> ObserverState {
        self.state
    }

    /// Current counters as last reported by the server.
    pub fn progress(&self) -> BatchProgress {
        self.progress
    }

    /// Advance the machine. Returns the effects to execute, in order.
    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        match (self.state, input) {
            // ---- Startup -------------------------------------------------
            (ObserverState::Idle, Input::StartObserving) => {
                self.state = ObserverState::Connecting;
                vec![Effect::OpenStream]
            }

            // ---- Connection lifecycle -----------------------------------
            (ObserverState::Connecting, Input::Opened) => {
                // The attempt bound applies to consecutive failures, so a
                // successful open resets it.
                self.attempts = 0;
                self.state = ObserverState::Streaming;
                vec![]
            }

            (ObserverState::Connecting | ObserverState::Streaming, Input::TransportClosed) => {
                self.attempts += 1;
                if self.policy.is_exhausted(self.attempts) {
                    self.state = ObserverState::Polling;
                    vec![
                        Effect::AppendActivity(
                            "Stream nicht erreichbar, wechsle zu Status-Abfragen".into(),
                        ),
                        Effect::Sleep(POLL_INTERVAL),
                    ]
                } else {
                    let attempt = self.attempts;
                    self.state = ObserverState::Reconnecting { attempt };
                    vec![Effect::Sleep(self.policy.delay_for(attempt))]
                }
            }

            (ObserverState::Reconnecting { .. }, Input::SleepElapsed) => {
                self.state = ObserverState::Connecting;
                vec![Effect::OpenStream]
            }

            // ---- Stream events ------------------------------------------
            (ObserverState::Streaming, Input::Event(event)) => self.on_stream_event(event),

            // ---- Polling fallback ---------------------------------------
            (ObserverState::Polling, Input::SleepElapsed) => vec![Effect::PollStatus],

            (ObserverState::Polling, Input::PollResult(progress)) => {
                self.progress = progress;
                if progress.is_processing {
                    vec![Effect::Sleep(POLL_INTERVAL)]
                } else {
                    self.state = ObserverState::Done;
                    vec![
                        Effect::AppendActivity("Verarbeitung abgeschlossen".into()),
                        Effect::FetchFinalList,
                    ]
                }
            }

            // Transient poll failures keep the cadence; the job is
            // server-owned and will still be there next tick.
            (ObserverState::Polling, Input::PollFailed) => vec![Effect::Sleep(POLL_INTERVAL)],

            // ---- Absorbing state / everything else ----------------------
            (ObserverState::Done, _) => vec![],
            _ => vec![],
        }
    }

    fn on_stream_event(&mut self, event: BatchStreamEvent) -> Vec<Effect> {
        match event {
            // Snapshots REPLACE counters; never add.
            BatchStreamEvent::Start {
                total,
                processed,
                failed,
            } => {
                self.replace_counters(total, processed, failed, true);
                vec![Effect::AppendActivity(format!(
                    "Analyse gestartet: {total} E-Mails"
                ))]
            }
            BatchStreamEvent::Reconnect {
                total,
                processed,
                failed,
            } => {
                self.replace_counters(total, processed, failed, true);
                vec![Effect::AppendActivity(format!(
                    "Verbindung wiederhergestellt: {processed}/{total}"
                ))]
            }

            // Advisory only: no counter arithmetic.
            BatchStreamEvent::Step {
                email_id,
                phase,
                detail,
            } => {
                let line = match (phase, detail) {
                    (StepPhase::Thinking, _) => format!("E-Mail {email_id}: Analyse läuft"),
                    (StepPhase::ToolBegin, Some(d)) => format!("E-Mail {email_id}: {d}"),
                    (StepPhase::ToolBegin, None) => format!("E-Mail {email_id}: Werkzeugaufruf"),
                    (StepPhase::ToolEnd, _) => format!("E-Mail {email_id}: Werkzeug fertig"),
                    (StepPhase::Done, _) => format!("E-Mail {email_id}: fertig"),
                    (StepPhase::Error, Some(d)) => format!("E-Mail {email_id}: Fehler — {d}"),
                    (StepPhase::Error, None) => format!("E-Mail {email_id}: Fehler"),
                };
                vec![Effect::AppendActivity(line)]
            }

            BatchStreamEvent::Progress {
                total,
                processed,
                failed,
                record,
            } => {
                self.replace_counters(total, processed, failed, true);
                match record {
                    Some(record) => vec![Effect::MergeRecord(record)],
                    None => vec![],
                }
            }

            // Per-item failure: logged and tallied server-side; the next
            // counter snapshot carries the updated `failed`.
            BatchStreamEvent::Error { email_id, message } => vec![Effect::AppendActivity(
                format!("E-Mail {email_id} fehlgeschlagen: {message}"),
            )],

            BatchStreamEvent::Complete {
                total,
                processed,
                failed,
            } => {
                self.replace_counters(total, processed, failed, false);
                self.state = ObserverState::Done;
                vec![
                    Effect::AppendActivity(format!(
                        "Analyse abgeschlossen: {processed}/{total} ({failed} Fehler)"
                    )),
                    Effect::FetchFinalList,
                ]
            }

            BatchStreamEvent::FatalError { message } => {
                self.progress.is_processing = false;
                self.state = ObserverState::Done;
                vec![
                    Effect::NotifyFailure(format!("KI-Analyse abgebrochen: {message}")),
                    Effect::FetchFinalList,
                ]
            }
        }
    }

    fn replace_counters(&mut self, total: i64, processed: i64, failed: i64, is_processing: bool) {
        self.progress = BatchProgress {
            total,
            processed,
            failed,
            is_processing,
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::backoff::MAX_RECONNECT_ATTEMPTS;

    fn machine() -> ObserverMachine {
        ObserverMachine::new(ReconnectPolicy::default())
    }

    fn progress_event(processed: i64) -> Input {
        Input::Event(BatchStreamEvent::Progress {
            total: 50,
            processed,
            failed: 0,
            record: None,
        })
    }

    /// Drive a fresh machine into `Streaming` with a started batch.
    fn streaming_machine() -> ObserverMachine {
        let mut m = machine();
        assert_eq!(m.handle(Input::StartObserving), vec![Effect::OpenStream]);
        assert!(m.handle(Input::Opened).is_empty());
        m.handle(Input::Event(BatchStreamEvent::Start {
            total: 50,
            processed: 0,
            failed: 0,
        }));
        assert_eq!(m.state(), ObserverState::Streaming);
        m
    }

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[test]
    fn progress_events_replace_counters() {
        let mut m = streaming_machine();
        for n in 1..=10 {
            m.handle(progress_event(n));
        }
        assert_eq!(m.progress().processed, 10);
        assert_eq!(m.progress().total, 50);
    }

    #[test]
    fn complete_ends_with_authoritative_refresh() {
        let mut m = streaming_machine();
        let effects = m.handle(Input::Event(BatchStreamEvent::Complete {
            total: 50,
            processed: 50,
            failed: 3,
        }));
        assert_eq!(m.state(), ObserverState::Done);
        assert!(!m.progress().is_processing);
        assert!(effects.contains(&Effect::FetchFinalList));
    }

    #[test]
    fn progress_with_record_requests_merge() {
        let mut m = streaming_machine();
        let record = serde_json::json!({ "id": 7, "ai_category": "termin" });
        let effects = m.handle(Input::Event(BatchStreamEvent::Progress {
            total: 50,
            processed: 1,
            failed: 0,
            record: Some(record.clone()),
        }));
        assert_eq!(effects, vec![Effect::MergeRecord(record)]);
    }

    // -----------------------------------------------------------------------
    // Property 2 + scenario 6: no double counting across reconnects
    // -----------------------------------------------------------------------

    #[test]
    fn reconnect_snapshot_replaces_not_adds() {
        let mut m = streaming_machine();

        // 10 progress events, then the transport drops.
        for n in 1..=10 {
            m.handle(progress_event(n));
        }
        assert_eq!(m.progress().processed, 10);

        // Three failed reconnects with delays 1s, 2s, 4s.
        for expected_delay in [1u64, 2, 4] {
            let effects = m.handle(Input::TransportClosed);
            assert_eq!(
                effects,
                vec![Effect::Sleep(Duration::from_secs(expected_delay))]
            );
            assert_eq!(m.handle(Input::SleepElapsed), vec![Effect::OpenStream]);
        }

        // The fourth attempt succeeds and re-synchronizes at 37.
        m.handle(Input::Opened);
        m.handle(Input::Event(BatchStreamEvent::Reconnect {
            total: 50,
            processed: 37,
            failed: 2,
        }));

        // 37/50, not 47/50 (addition) and not 10/50 (stale).
        assert_eq!(m.progress().processed, 37);
        assert_eq!(m.progress().total, 50);
        assert_eq!(m.progress().failed, 2);
        assert_eq!(m.state(), ObserverState::Streaming);
    }

    #[test]
    fn successful_open_resets_the_attempt_budget() {
        let mut m = streaming_machine();

        // Burn three attempts, then reconnect successfully.
        for _ in 0..3 {
            m.handle(Input::TransportClosed);
            m.handle(Input::SleepElapsed);
        }
        m.handle(Input::Opened);

        // The next failure starts over at attempt 1 (1s delay).
        let effects = m.handle(Input::TransportClosed);
        assert_eq!(effects, vec![Effect::Sleep(Duration::from_secs(1))]);
        assert_matches!(m.state(), ObserverState::Reconnecting { attempt: 1 });
    }

    // -----------------------------------------------------------------------
    // Property 3: bounded retry, non-decreasing capped delays
    // -----------------------------------------------------------------------

    #[test]
    fn reconnect_attempts_are_bounded_then_polling_takes_over() {
        let mut m = streaming_machine();

        let mut last_delay = Duration::ZERO;
        for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
            let effects = m.handle(Input::TransportClosed);
            let delay = match &effects[..] {
                [Effect::Sleep(d)] => *d,
                other => panic!("attempt {attempt}: unexpected effects {other:?}"),
            };
            assert!(delay >= last_delay, "delay shrank at attempt {attempt}");
            assert!(delay <= Duration::from_secs(15));
            last_delay = delay;
            m.handle(Input::SleepElapsed);
        }

        // Attempt 11 crosses the budget: switch to polling.
        let effects = m.handle(Input::TransportClosed);
        assert_eq!(m.state(), ObserverState::Polling);
        assert!(effects.contains(&Effect::Sleep(POLL_INTERVAL)));
    }

    // -----------------------------------------------------------------------
    // Properties 1 + 4: polling fallback converges
    // -----------------------------------------------------------------------

    fn polling_machine() -> ObserverMachine {
        let mut m = streaming_machine();
        for _ in 0..=MAX_RECONNECT_ATTEMPTS {
            m.handle(Input::TransportClosed);
            m.handle(Input::SleepElapsed);
        }
        assert_eq!(m.state(), ObserverState::Polling);
        m
    }

    #[test]
    fn poll_tick_queries_status() {
        let mut m = polling_machine();
        // polling_machine consumed the pending sleep; next tick polls.
        assert_eq!(m.handle(Input::SleepElapsed), vec![Effect::PollStatus]);
    }

    #[test]
    fn poll_keeps_cadence_while_processing() {
        let mut m = polling_machine();
        let effects = m.handle(Input::PollResult(BatchProgress {
            total: 50,
            processed: 42,
            failed: 1,
            is_processing: true,
        }));
        assert_eq!(effects, vec![Effect::Sleep(POLL_INTERVAL)]);
        assert_eq!(m.progress().processed, 42);
        assert_eq!(m.state(), ObserverState::Polling);
    }

    #[test]
    fn poll_detects_completion_within_one_cycle() {
        let mut m = polling_machine();
        let effects = m.handle(Input::PollResult(BatchProgress {
            total: 50,
            processed: 50,
            failed: 2,
            is_processing: false,
        }));
        assert_eq!(m.state(), ObserverState::Done);
        assert!(effects.contains(&Effect::FetchFinalList));
        assert_eq!(m.progress().processed, 50);
    }

    #[test]
    fn poll_failures_never_abort_the_fallback() {
        let mut m = polling_machine();
        for _ in 0..5 {
            assert_eq!(m.handle(Input::PollFailed), vec![Effect::Sleep(POLL_INTERVAL)]);
            assert_eq!(m.handle(Input::SleepElapsed), vec![Effect::PollStatus]);
        }
        assert_eq!(m.state(), ObserverState::Polling);
    }

    // -----------------------------------------------------------------------
    // Property 5: per-item isolation
    // -----------------------------------------------------------------------

    #[test]
    fn item_error_does_not_stop_streaming() {
        let mut m = streaming_machine();
        let effects = m.handle(Input::Event(BatchStreamEvent::Error {
            email_id: 7,
            message: "model returned garbage".into(),
        }));
        assert_eq!(m.state(), ObserverState::Streaming);
        assert_matches!(&effects[..], [Effect::AppendActivity(_)]);
        // Counters stay untouched until the next server snapshot.
        assert_eq!(m.progress().failed, 0);
    }

    #[test]
    fn fatal_error_notifies_and_refreshes() {
        let mut m = streaming_machine();
        let effects = m.handle(Input::Event(BatchStreamEvent::FatalError {
            message: "credentials rejected".into(),
        }));
        assert_eq!(m.state(), ObserverState::Done);
        assert_matches!(
            &effects[..],
            [Effect::NotifyFailure(_), Effect::FetchFinalList]
        );
    }

    // -----------------------------------------------------------------------
    // Step events are advisory
    // -----------------------------------------------------------------------

    #[test]
    fn step_events_never_touch_counters() {
        let mut m = streaming_machine();
        m.handle(progress_event(5));

        let effects = m.handle(Input::Event(BatchStreamEvent::Step {
            email_id: 9,
            phase: StepPhase::ToolBegin,
            detail: Some("Kalender prüfen".into()),
        }));
        assert_matches!(&effects[..], [Effect::AppendActivity(_)]);
        assert_eq!(m.progress().processed, 5);
    }

    // -----------------------------------------------------------------------
    // Absorbing terminal state
    // -----------------------------------------------------------------------

    #[test]
    fn done_ignores_everything() {
        let mut m = streaming_machine();
        m.handle(Input::Event(BatchStreamEvent::Complete {
            total: 50,
            processed: 50,
            failed: 0,
        }));
        assert_eq!(m.state(), ObserverState::Done);

        assert!(m.handle(Input::TransportClosed).is_empty());
        assert!(m.handle(progress_event(99)).is_empty());
        assert!(m.handle(Input::FinalListLoaded).is_empty());
        assert_eq!(m.progress().processed, 50);
    }

    #[test]
    fn idle_ignores_stray_inputs() {
        let mut m = machine();
        assert!(m.handle(Input::TransportClosed).is_empty());
        assert!(m.handle(Input::SleepElapsed).is_empty());
        assert_eq!(m.state(), ObserverState::Idle);
    }
}
