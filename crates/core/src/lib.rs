//! Kontor domain logic shared across the workspace.
//!
//! This crate has zero internal dependencies so the database layer, the
//! API server, and the batch observer client can all build on it:
//!
//! - [`types`] — common id and timestamp aliases.
//! - [`error`] — the [`CoreError`](error::CoreError) taxonomy.
//! - [`roles`] — user role name constants.
//! - [`batch`] — the AI batch-job descriptor, lifecycle state machine,
//!   and the stream event protocol shared by producer and consumer.
//! - [`slots`] — booking-slot series generation.
//! - [`event_names`] — platform event type constants.

pub mod batch;
pub mod error;
pub mod event_names;
pub mod roles;
pub mod slots;
pub mod types;
