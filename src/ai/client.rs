//! Gemini completion client
//!
//! Encapsulates the single upstream call used to generate repository summaries.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::core::config::AppConfig;

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Raw failure from one upstream call.
///
/// `status` carries the HTTP status when the upstream answered at all;
/// transport failures leave it empty and only the message is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    #[must_use]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{status}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// A text-completion backend: prompt in, generated text out.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// # Errors
    ///
    /// Returns the upstream failure for this single attempt.
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}

pub struct GeminiClient {
    api_key: String,
    model_name: String,
    base_url: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: String, model_name: String, base_url: String) -> Self {
        Self {
            api_key,
            model_name,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        )
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionApi for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        info!(
            model = %self.model_name,
            prompt_chars = prompt.chars().count(),
            "Calling Gemini generateContent"
        );

        let request_body = build_request_body(prompt);

        let response = HTTP_CLIENT
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| UpstreamError::new(None, format!("Gemini API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(UpstreamError::new(
                Some(status.as_u16()),
                format!("{status}: {}", error_message(&error_text)),
            ));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            UpstreamError::new(None, format!("Failed to parse Gemini response: {e}"))
        })?;

        extract_text(&response_json)
            .ok_or_else(|| UpstreamError::new(None, "No text in Gemini response"))
    }
}

#[must_use]
pub fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ]
    })
}

/// Concatenates the text parts of the first candidate.
#[must_use]
pub fn extract_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

/// Pulls `error.message` out of a Google API error body, falling back to
/// the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
