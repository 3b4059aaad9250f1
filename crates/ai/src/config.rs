//! AI API configuration from environment variables.

/// Connection settings for the completion API.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible API, without a trailing slash.
    pub api_url: String,
    /// Bearer key sent in the `Authorization` header.
    pub api_key: String,
    /// Model identifier passed on every request.
    pub model: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default                     |
    /// |---------------------------|----------|-----------------------------|
    /// | `AI_API_URL`              | no       | `https://api.openai.com/v1` |
    /// | `AI_API_KEY`              | **yes**  | --                          |
    /// | `AI_MODEL`                | no       | `gpt-4o-mini`               |
    /// | `AI_REQUEST_TIMEOUT_SECS` | no       | `60`                        |
    ///
    /// # Panics
    ///
    /// Panics if `AI_API_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let api_url = std::env::var("AI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into())
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("AI_API_KEY").expect("AI_API_KEY must be set");
        assert!(!api_key.is_empty(), "AI_API_KEY must not be empty");

        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

        let request_timeout_secs: u64 = std::env::var("AI_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("AI_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            request_timeout_secs,
        }
    }
}
