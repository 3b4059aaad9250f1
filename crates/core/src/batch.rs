//! AI batch-job descriptor, lifecycle state machine, and stream protocol.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! the repository layer, the API's batch engine, and the observer client
//! without either side depending on the other.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Batch descriptor
// ---------------------------------------------------------------------------

/// Counters describing a server-side batch run.
///
/// The database row is the source of truth; every stream event carries a
/// copy of these counters so observers can always REPLACE local state
/// instead of accumulating deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Total number of items queued when the batch started.
    pub total: i64,
    /// Items handled so far, successes and failures combined.
    pub processed: i64,
    /// Items that failed individually (non-fatal).
    pub failed: i64,
    /// Whether the batch is still running server-side.
    pub is_processing: bool,
}

impl BatchProgress {
    /// Items not yet handled.
    pub fn pending(&self) -> i64 {
        (self.total - self.processed).max(0)
    }
}

// ---------------------------------------------------------------------------
// Lifecycle state machine
// ---------------------------------------------------------------------------

/// Batch status IDs matching the `batch_statuses` seed data (1-based).
///
/// The id table is intentionally duplicated from the `db` crate's
/// `BatchStatus` enum because `core` must have zero internal deps.
pub mod state_machine {
    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Terminal states (Completed=3, Failed=4) return an empty slice
    /// because no further transitions are allowed.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Pending -> Running
            1 => &[2],
            // Running -> Completed, Failed
            2 => &[3, 4],
            // Terminal states: Completed, Failed
            3 | 4 => &[],
            // Unknown status: no transitions allowed
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            let from_name = status_name(from);
            let to_name = status_name(to);
            Err(format!(
                "Invalid transition: {from_name} ({from}) -> {to_name} ({to})"
            ))
        }
    }

    /// Human-readable name for a status ID (for error messages).
    fn status_name(id: i16) -> &'static str {
        match id {
            1 => "Pending",
            2 => "Running",
            3 => "Completed",
            4 => "Failed",
            _ => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Stream protocol
// ---------------------------------------------------------------------------

/// Activity phase of a single item inside the batch.
///
/// Step events are advisory: observers render them in an activity log and
/// never derive counter arithmetic from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// The model is working on the item.
    Thinking,
    /// A tool invocation began.
    ToolBegin,
    /// A tool invocation finished.
    ToolEnd,
    /// The item finished successfully.
    Done,
    /// The item finished with an error.
    Error,
}

/// One message on a batch progress stream.
///
/// Serialized with an internal `type` tag so the wire format is a
/// discriminated event. `start` and `reconnect` share a payload shape on
/// purpose: both are full counter snapshots that observers must take
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BatchStreamEvent {
    /// First message on a fresh stream: counters known so far.
    Start {
        total: i64,
        processed: i64,
        failed: i64,
    },

    /// First message after a resubscription to a running job.
    ///
    /// Observers REPLACE their counters with this payload; adding it to
    /// local state would double-count everything seen before the drop.
    Reconnect {
        total: i64,
        processed: i64,
        failed: i64,
    },

    /// Sub-event of one item, for the human-readable activity log only.
    Step {
        email_id: i64,
        phase: StepPhase,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    /// One unit of work completed; carries the updated counters and,
    /// when available, the updated record for identity-keyed merging.
    Progress {
        total: i64,
        processed: i64,
        failed: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        record: Option<serde_json::Value>,
    },

    /// A single item failed. Non-fatal: processing continues.
    Error { email_id: i64, message: String },

    /// Terminal success with final counters.
    Complete {
        total: i64,
        processed: i64,
        failed: i64,
    },

    /// The whole batch aborted. Terminal.
    FatalError { message: String },
}

impl BatchStreamEvent {
    /// The SSE `event:` field name for this message.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Reconnect { .. } => "reconnect",
            Self::Step { .. } => "step",
            Self::Progress { .. } => "progress",
            Self::Error { .. } => "error",
            Self::Complete { .. } => "complete",
            Self::FatalError { .. } => "fatal-error",
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::FatalError { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::state_machine::*;
    use super::*;

    // -----------------------------------------------------------------------
    // Lifecycle transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_running() {
        assert!(can_transition(1, 2));
    }

    #[test]
    fn running_to_completed() {
        assert!(can_transition(2, 3));
    }

    #[test]
    fn running_to_failed() {
        assert!(can_transition(2, 4));
    }

    #[test]
    fn completed_has_no_transitions() {
        assert!(valid_transitions(3).is_empty());
    }

    #[test]
    fn failed_has_no_transitions() {
        assert!(valid_transitions(4).is_empty());
    }

    #[test]
    fn pending_to_completed_invalid() {
        assert!(!can_transition(1, 3));
    }

    #[test]
    fn completed_to_running_invalid() {
        assert!(!can_transition(3, 2));
    }

    #[test]
    fn unknown_status_has_no_transitions() {
        assert!(valid_transitions(99).is_empty());
    }

    #[test]
    fn validate_transition_err_names_both_states() {
        let err = validate_transition(3, 2).unwrap_err();
        assert!(err.contains("Completed"));
        assert!(err.contains("Running"));
    }

    // -----------------------------------------------------------------------
    // Wire format
    // -----------------------------------------------------------------------

    #[test]
    fn progress_event_round_trips_with_tag() {
        let event = BatchStreamEvent::Progress {
            total: 50,
            processed: 11,
            failed: 1,
            record: None,
        };

        let json = serde_json::to_value(&event).expect("serializable");
        assert_eq!(json["type"], "progress");
        assert_eq!(json["processed"], 11);
        // `record` is omitted when absent, not serialized as null.
        assert!(json.get("record").is_none());

        let back: BatchStreamEvent = serde_json::from_value(json).expect("deserializable");
        assert_eq!(back, event);
    }

    #[test]
    fn fatal_error_uses_kebab_case_tag() {
        let event = BatchStreamEvent::FatalError {
            message: "model unavailable".into(),
        };
        let json = serde_json::to_value(&event).expect("serializable");
        assert_eq!(json["type"], "fatal-error");
        assert_eq!(event.event_name(), "fatal-error");
        assert!(event.is_terminal());
    }

    #[test]
    fn start_and_reconnect_share_payload_shape() {
        let start: BatchStreamEvent =
            serde_json::from_str(r#"{"type":"start","total":50,"processed":0,"failed":0}"#)
                .expect("start parses");
        let reconnect: BatchStreamEvent =
            serde_json::from_str(r#"{"type":"reconnect","total":50,"processed":37,"failed":2}"#)
                .expect("reconnect parses");

        assert!(matches!(start, BatchStreamEvent::Start { total: 50, .. }));
        assert!(matches!(
            reconnect,
            BatchStreamEvent::Reconnect { processed: 37, .. }
        ));
    }

    #[test]
    fn step_event_is_not_terminal() {
        let event = BatchStreamEvent::Step {
            email_id: 7,
            phase: StepPhase::ToolBegin,
            detail: Some("lookup booking".into()),
        };
        assert!(!event.is_terminal());
        assert_eq!(event.event_name(), "step");
    }

    #[test]
    fn progress_pending_never_negative() {
        let progress = BatchProgress {
            total: 10,
            processed: 12,
            failed: 0,
            is_processing: false,
        };
        assert_eq!(progress.pending(), 0);
    }
}
