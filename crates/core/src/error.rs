//! Domain error taxonomy.
//!
//! [`CoreError`] is the error currency of the pure-logic layer. The API
//! crate maps each variant onto an HTTP status in its `AppError`
//! `IntoResponse` impl.

use crate::types::DbId;

/// Domain-level error shared by all Kontor crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Email"`, `"Booking"`.
        entity: &'static str,
        /// The id that was looked up.
        id: DbId,
    },

    /// Input failed a domain validation rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation conflicts with current state (double booking,
    /// lock held by another user, job already running).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected internal failure; details are logged, not surfaced.
    #[error("Internal error: {0}")]
    Internal(String),
}
