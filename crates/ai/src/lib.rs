//! Client for the external AI completion API.
//!
//! The batch engine uses [`AiClient::triage`] to classify an email,
//! summarize it, and draft a reply in one JSON-mode completion call.
//! [`AiError::is_fatal`] encodes which failures abort a whole batch
//! (credentials, configuration) versus a single item.

pub mod client;
pub mod config;
pub mod error;

pub use client::{AiClient, TokenUsage, Triage, TriageOutcome};
pub use config::AiConfig;
pub use error::AiError;
