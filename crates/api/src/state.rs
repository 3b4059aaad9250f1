use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::mailer::Mailer;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kontor_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<kontor_events::EventBus>,
    /// Per-batch-job progress channels feeding the SSE endpoints.
    pub progress_hub: Arc<kontor_events::ProgressHub>,
    /// Client for the external AI completion API.
    pub ai: kontor_ai::AiClient,
    /// Outbound SMTP transport for replies and newsletter sends.
    pub mailer: Mailer,
    /// Per-client token buckets backing the 429 middleware.
    pub rate_limiter: Arc<RateLimiter>,
    /// Process start time, reported by the health endpoint.
    pub started_at: Instant,
}
