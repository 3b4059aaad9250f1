//! HTTP client for an OpenAI-compatible chat completions API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::AiError;

/// Result of triaging one email.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Triage {
    /// One of the categories named in the system prompt
    /// (`anfrage`, `termin`, `rechnung`, `beschwerde`, `spam`, `sonstiges`).
    pub category: String,
    /// Two-sentence summary of the email.
    pub summary: String,
    /// Draft reply in the email's language.
    pub suggested_reply: String,
}

/// Token counts reported by the API for one call.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
}

/// A triage result together with its usage accounting.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub triage: Triage,
    pub usage: TokenUsage,
}

/// System prompt constraining the model to the JSON triage contract.
const TRIAGE_SYSTEM_PROMPT: &str = "\
Du bist das Triage-System eines Büro-Postfachs. Antworte ausschließlich \
mit einem JSON-Objekt mit den Feldern \"category\" (eine aus: anfrage, \
termin, rechnung, beschwerde, spam, sonstiges), \"summary\" (maximal zwei \
Sätze) und \"suggested_reply\" (höflicher Antwortentwurf in der Sprache \
der E-Mail).";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the completion API. Cheap to clone; holds a pooled
/// `reqwest::Client`.
#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl AiClient {
    /// Build a client from config. Fails on an unusable timeout or URL.
    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        if !config.api_url.starts_with("http") {
            return Err(AiError::Config(format!(
                "AI_API_URL must be an http(s) URL, got '{}'",
                config.api_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// The configured model identifier, for usage accounting.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Triage one email: category, summary, suggested reply.
    pub async fn triage(&self, subject: &str, body: &str) -> Result<TriageOutcome, AiError> {
        let user_prompt = format!("Betreff: {subject}\n\n{body}");
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: TRIAGE_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        let url = format!("{}/chat/completions", self.config.api_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AiError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("invalid completion envelope: {e}")))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AiError::Parse("completion had no choices".into()))?;

        let triage = parse_triage(content)?;
        tracing::debug!(
            category = %triage.category,
            prompt_tokens = body.usage.prompt_tokens,
            completion_tokens = body.usage.completion_tokens,
            "Email triaged"
        );

        Ok(TriageOutcome {
            triage,
            usage: body.usage,
        })
    }
}

/// Parse the model's JSON content into a [`Triage`].
///
/// Tolerates a Markdown code fence around the object, which some models
/// emit even in JSON mode.
fn parse_triage(content: &str) -> Result<Triage, AiError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(trimmed)
        .map_err(|e| AiError::Parse(format!("triage object invalid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_content() {
        let triage = parse_triage(
            r#"{"category":"termin","summary":"Kunde möchte einen Termin.","suggested_reply":"Gerne!"}"#,
        )
        .unwrap();
        assert_eq!(triage.category, "termin");
    }

    #[test]
    fn parses_fenced_json_content() {
        let content = "```json\n{\"category\":\"anfrage\",\"summary\":\"s\",\"suggested_reply\":\"r\"}\n```";
        let triage = parse_triage(content).unwrap();
        assert_eq!(triage.category, "anfrage");
    }

    #[test]
    fn rejects_non_json_content() {
        let err = parse_triage("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = parse_triage(r#"{"category":"spam"}"#).unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[test]
    fn client_rejects_non_http_url() {
        let config = AiConfig {
            api_url: "ftp://example.org".into(),
            api_key: "k".into(),
            model: "m".into(),
            request_timeout_secs: 5,
        };
        assert!(matches!(AiClient::new(config), Err(AiError::Config(_))));
    }
}
