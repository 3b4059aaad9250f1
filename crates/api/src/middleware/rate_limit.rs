//! Token-bucket rate limiting with `Retry-After` on rejection.
//!
//! One bucket per client key (the bearer token when present, otherwise
//! the forwarded client address). Rejected requests receive 429 with a
//! whole-second `Retry-After` so clients can show a countdown.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-client token buckets. Shared via `Arc` in [`AppState`].
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// A limiter allowing `per_minute` requests per client, with bursts
    /// up to the same amount.
    pub fn new(per_minute: u32) -> Self {
        let capacity = f64::from(per_minute.max(1));
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity,
            refill_per_sec: capacity / 60.0,
        }
    }

    /// Take one token for `key`, or return the whole seconds until a
    /// token will be available.
    pub fn try_acquire(&self, key: &str) -> Result<(), u64> {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut buckets = self.buckets.lock().expect("rate limiter lock poisoned");
        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - bucket.tokens;
            Err((deficit / self.refill_per_sec).ceil() as u64)
        }
    }
}

/// Axum middleware enforcing the limiter on every request under
/// `/api/v1`.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers());
    match state.rate_limiter.try_acquire(&key) {
        Ok(()) => next.run(request).await,
        Err(retry_after_secs) => {
            tracing::warn!(retry_after_secs, "Request rate limited");
            AppError::RateLimited { retry_after_secs }.into_response()
        }
    }
}

/// Derive the bucket key: the bearer token when present, otherwise the
/// forwarded client address, otherwise a shared anonymous bucket.
fn client_key(headers: &HeaderMap) -> String {
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return format!("token:{token}");
    }
    if let Some(addr) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        return format!("addr:{}", addr.trim());
    }
    "anonymous".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn burst_up_to_capacity_then_reject() {
        let limiter = RateLimiter::new(60);
        let now = Instant::now();

        for _ in 0..60 {
            assert!(limiter.try_acquire_at("k", now).is_ok());
        }
        assert!(limiter.try_acquire_at("k", now).is_err());
    }

    #[test]
    fn retry_after_is_positive_and_bounded() {
        let limiter = RateLimiter::new(60); // 1 token/sec
        let now = Instant::now();
        for _ in 0..60 {
            let _ = limiter.try_acquire_at("k", now);
        }

        let secs = limiter.try_acquire_at("k", now).unwrap_err();
        assert!(secs >= 1, "retry-after must be at least one second");
        assert!(secs <= 2, "one token refills within a second, got {secs}");
    }

    #[test]
    fn tokens_refill_over_time() {
        let limiter = RateLimiter::new(60); // 1 token/sec
        let start = Instant::now();
        for _ in 0..60 {
            let _ = limiter.try_acquire_at("k", start);
        }
        assert!(limiter.try_acquire_at("k", start).is_err());

        let later = start + Duration::from_secs(2);
        assert!(limiter.try_acquire_at("k", later).is_ok());
    }

    #[test]
    fn clients_have_independent_buckets() {
        let limiter = RateLimiter::new(1);
        let now = Instant::now();

        assert!(limiter.try_acquire_at("a", now).is_ok());
        assert!(limiter.try_acquire_at("a", now).is_err());
        assert!(limiter.try_acquire_at("b", now).is_ok());
    }

    #[test]
    fn key_prefers_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        headers.insert("x-forwarded-for", "10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers), "token:abc");
    }

    #[test]
    fn key_falls_back_to_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2".parse().unwrap());
        assert_eq!(client_key(&headers), "addr:10.0.0.1");
    }

    #[test]
    fn key_defaults_to_anonymous() {
        assert_eq!(client_key(&HeaderMap::new()), "anonymous");
    }
}
