//! Kontor event infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, feeding the global notification stream.
//! - [`OfficeEvent`] — the canonical domain event envelope.
//! - [`ProgressHub`] — per-batch-job broadcast channels carrying the
//!   batch stream protocol to SSE subscribers.
//! - [`EventPersistence`] — background task that writes every bus event
//!   to the application log table.

pub mod bus;
pub mod persistence;
pub mod progress;

pub use bus::{EventBus, OfficeEvent};
pub use persistence::EventPersistence;
pub use progress::ProgressHub;
