use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::GatewayError;

/// Repository fields supplied by the browser for one summary request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositorySummaryRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_stars")]
    pub stars: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
}

impl RepositorySummaryRequest {
    /// Checks the fields the gateway cannot summarize without.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `full_name` or `description` is missing or blank.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !present(&self.full_name) || !present(&self.description) {
            return Err(GatewayError::InvalidInput(
                "Invalid repository data".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequestBody {
    #[serde(rename = "repoData", default)]
    pub repo_data: Option<RepositorySummaryRequest>,
}

impl SummarizeRequestBody {
    /// Parses a JSON body and returns the validated repository data.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed JSON, a missing `repoData`, or
    /// missing required fields.
    pub fn parse(body: &str) -> Result<RepositorySummaryRequest, GatewayError> {
        let parsed: SummarizeRequestBody = serde_json::from_str(body)?;
        let repo = parsed.repo_data.ok_or_else(|| {
            GatewayError::InvalidInput("Invalid repository data".to_string())
        })?;
        repo.validate()?;
        Ok(repo)
    }
}

/// Star counts arrive from the browser as numbers or numeric strings.
/// Anything negative, fractional-below-zero or non-numeric becomes 0.
fn lenient_stars<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let as_float = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(match as_float {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(f) if f.is_finite() && f >= 0.0 => f.trunc() as u64,
        _ => 0,
    })
}

/// Raw request body as delivered by the function URL / API Gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBody<'a> {
    pub body: Option<&'a str>,
    pub is_base64_encoded: bool,
}

impl RequestBody<'_> {
    /// # Errors
    ///
    /// Returns `InvalidInput` for a missing body, invalid base64, or a
    /// decoded body that is not UTF-8.
    pub fn decode(&self) -> Result<String, GatewayError> {
        let Some(body) = self.body else {
            return Err(GatewayError::InvalidInput("Missing body".to_string()));
        };

        if !self.is_base64_encoded {
            return Ok(body.to_string());
        }

        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| GatewayError::InvalidInput(format!("Invalid base64 body: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| GatewayError::InvalidInput(format!("Body is not UTF-8: {e}")))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Status code and JSON body handed back to the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    #[must_use]
    pub fn ok(text: String) -> Self {
        Self {
            status: 200,
            body: serde_json::to_value(SummaryResponse { text }).unwrap_or(Value::Null),
        }
    }

    #[must_use]
    pub fn error(status: u16, message: String, details: Option<String>) -> Self {
        let body = ErrorBody {
            error: message,
            details,
        };
        Self {
            status,
            body: serde_json::to_value(body).unwrap_or(Value::Null),
        }
    }

    #[must_use]
    pub fn from_error(err: &GatewayError) -> Self {
        Self::error(err.status_code(), err.client_message(), None)
    }
}

/// Query forwarded to the repository search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub sort: String,
    pub order: String,
    pub per_page: String,
    pub page: Option<String>,
}
