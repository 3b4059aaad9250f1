//! AI client error type.

/// Failure of a single AI API call.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The API rejected our credentials. Retrying other items with the
    /// same key cannot succeed.
    #[error("AI API rejected credentials (HTTP {status})")]
    Auth { status: u16 },

    /// The client is misconfigured (bad URL, unusable model).
    #[error("AI client misconfigured: {0}")]
    Config(String),

    /// The API returned a non-success status for this request.
    #[error("AI API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never completed (connect, timeout, TLS).
    #[error("AI API transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not contain a usable completion.
    #[error("AI API response unparsable: {0}")]
    Parse(String),
}

impl AiError {
    /// Whether this failure dooms the whole batch rather than one item.
    ///
    /// Credential and configuration failures apply to every subsequent
    /// call; everything else is counted against the single item and
    /// processing continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_is_fatal() {
        assert!(AiError::Auth { status: 401 }.is_fatal());
    }

    #[test]
    fn config_failure_is_fatal() {
        assert!(AiError::Config("bad url".into()).is_fatal());
    }

    #[test]
    fn api_failure_is_per_item() {
        let err = AiError::Api {
            status: 500,
            message: "overloaded".into(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn parse_failure_is_per_item() {
        assert!(!AiError::Parse("empty choices".into()).is_fatal());
    }
}
