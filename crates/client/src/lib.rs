//! Observer for server-side AI analysis batches.
//!
//! A batch runs to completion on the server whether or not anyone is
//! watching; this crate's job is to *watch reliably* over an unreliable
//! connection and always converge to the server's terminal state:
//!
//! 1. open the SSE feed and mirror counter snapshots ([`machine`]),
//! 2. on transport loss, reconnect with bounded exponential backoff
//!    ([`backoff`]),
//! 3. when reconnects are exhausted, fall back to polling the status
//!    endpoint until the server reports the job finished.
//!
//! The state machine is pure (all I/O lives in [`tracker`]), so every
//! reconnection property is testable without a network.

pub mod backoff;
pub mod decode;
pub mod machine;
pub mod tracker;

pub use backoff::ReconnectPolicy;
pub use machine::{Effect, Input, ObserverMachine, ObserverState};
pub use tracker::{DisplayState, ProgressTracker, TrackerConfig};
