//! Text generation backends.
//!
//! The controller only sees [`TextProvider`]: one prompt in, one complete reply
//! out. [`GeminiProvider`] is the production implementation.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use crate::core::message::TranscriptRole;
use crate::utils::url::model_method_url;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Everything that can go wrong while asking the provider for a reply.
/// The controller treats all variants the same way.
#[derive(Debug)]
pub enum ProviderError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    Request(reqwest::Error),
    /// The API answered with a non-success status.
    Status { status: u16, message: String },
    /// The API answered but the payload was not a usable reply.
    Malformed(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Request(err) => write!(f, "request failed: {err}"),
            ProviderError::Status { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Malformed(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

impl StdError for ProviderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProviderError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Request(err)
    }
}

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Human readable model name shown in the UI chrome.
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        model_method_url(&self.base_url, &self.model, "generateContent")
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request =
            GenerateContentRequest::from_prompt(TranscriptRole::User.to_api_role(), prompt);
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "sending generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: summarize_error_body(&body),
            });
        }

        parse_reply(&body)
    }
}

/// Extract the reply text from a successful `generateContent` body.
pub fn parse_reply(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::Malformed(format!("invalid JSON: {err}")))?;

    match parsed.text() {
        Some(text) => Ok(text),
        None => match parsed.block_reason() {
            Some(reason) => Err(ProviderError::Malformed(format!(
                "prompt was blocked ({reason})"
            ))),
            None => Err(ProviderError::Malformed("no candidates returned".to_string())),
        },
    }
}

/// Reduce an error body to a one-line message.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(trimmed) {
        let detail = parsed.error;
        if let Some(message) = detail.message.filter(|m| !m.trim().is_empty()) {
            let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
            return match detail.status {
                Some(status) => format!("{collapsed} ({status})"),
                None => collapsed,
            };
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_returns_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hi there"}]}}]}"#;
        assert_eq!(parse_reply(body).expect("reply"), "Hi there");
    }

    #[test]
    fn parse_reply_allows_empty_candidate() {
        let body = r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
        assert_eq!(parse_reply(body).expect("reply"), "");
    }

    #[test]
    fn parse_reply_reports_block_reason() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = parse_reply(body).expect_err("blocked");
        assert!(matches!(err, ProviderError::Malformed(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn parse_reply_rejects_non_json() {
        let err = parse_reply("<html>oops</html>").expect_err("not json");
        assert!(err.to_string().starts_with("malformed response: invalid JSON"));
    }

    #[test]
    fn error_summary_prefers_api_message() {
        let body = r#"{"error":{"code":403,"message":"Permission\n denied.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            summarize_error_body(body),
            "Permission denied. (PERMISSION_DENIED)"
        );
    }

    #[test]
    fn error_summary_falls_back_to_raw_text() {
        assert_eq!(summarize_error_body("  Bad   gateway \n"), "Bad gateway");
        assert_eq!(summarize_error_body(""), "<empty>");
    }

    #[test]
    fn status_error_display_includes_code() {
        let err = ProviderError::Status {
            status: 401,
            message: "API key not valid.".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 401): API key not valid.");
    }

    #[test]
    fn endpoint_targets_generate_content() {
        let provider = GeminiProvider::new(
            reqwest::Client::new(),
            "https://example.test/v1beta/",
            "key",
            DEFAULT_MODEL,
        );
        assert_eq!(
            provider.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(provider.model(), "gemini-2.5-flash");
    }
}
