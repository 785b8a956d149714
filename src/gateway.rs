//! Summarization gateway: throttle, validate, sanitize, prompt, invoke.
//!
//! Each stage is a hard gate. The rate-limit check runs before the body is
//! even decoded, so a throttled caller costs neither sanitization nor an
//! upstream call.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::ai::{
    CompletionApi, FailureKind, GeminiClient, RetryPolicy, UpstreamOutcome, invoke_with_retry,
};
use crate::core::config::AppConfig;
use crate::core::models::{JsonResponse, RequestBody, SummarizeRequestBody};
use crate::errors::GatewayError;
use crate::limits::{RateLimiter, client_fingerprint};
use crate::prompt::{SanitizedFields, build_prompt};

pub struct Gateway {
    limiter: RateLimiter,
    upstream: Arc<dyn CompletionApi>,
    retry: RetryPolicy,
}

impl Gateway {
    #[must_use]
    pub fn new(limiter: RateLimiter, upstream: Arc<dyn CompletionApi>, retry: RetryPolicy) -> Self {
        Self {
            limiter,
            upstream,
            retry,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            RateLimiter::new(config.rate_limit.clone()),
            Arc::new(GeminiClient::from_config(config)),
            config.retry.clone(),
        )
    }

    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Runs one summary request through every gate.
    ///
    /// # Errors
    ///
    /// `RateLimited` when the client is over budget, `InvalidInput` for a
    /// body that fails to decode or validate, and the upstream variants for
    /// failures of the completion call.
    pub async fn summarize(
        &self,
        client_id: &str,
        body: RequestBody<'_>,
    ) -> Result<String, GatewayError> {
        if !self.limiter.admit(client_id) {
            return Err(GatewayError::RateLimited(client_fingerprint(client_id)));
        }

        let raw = body.decode()?;
        let request = SummarizeRequestBody::parse(&raw)?;

        let fields = SanitizedFields::from_request(&request);
        let prompt = build_prompt(&fields, request.stars);

        #[cfg(feature = "debug-logs")]
        tracing::debug!("Using Gemini prompt:\n{}", prompt);

        match invoke_with_retry(self.upstream.as_ref(), &prompt, &self.retry).await {
            UpstreamOutcome::Success(text) => Ok(text),
            UpstreamOutcome::TerminalFailure(FailureKind::Unauthorized, message) => {
                Err(GatewayError::UpstreamUnauthorized(message))
            }
            UpstreamOutcome::TerminalFailure(FailureKind::Overloaded, message)
            | UpstreamOutcome::TransientFailure(message) => Err(GatewayError::UpstreamOverloaded {
                attempts: self.retry.max_attempts,
                message,
            }),
            UpstreamOutcome::TerminalFailure(FailureKind::Unknown, message) => {
                Err(GatewayError::UpstreamUnknown(message))
            }
        }
    }

    /// [`Gateway::summarize`] mapped onto a status code and JSON body.
    pub async fn handle(&self, client_id: &str, body: RequestBody<'_>) -> JsonResponse {
        match self.summarize(client_id, body).await {
            Ok(text) => {
                info!(summary_chars = text.chars().count(), "Summary generated");
                JsonResponse::ok(text)
            }
            Err(err) => {
                match &err {
                    GatewayError::RateLimited(_) | GatewayError::InvalidInput(_) => {
                        info!(status = err.status_code(), "Request rejected: {}", err);
                    }
                    GatewayError::UpstreamOverloaded { .. } => warn!("{}", err),
                    GatewayError::UpstreamUnauthorized(_) => {
                        error!("Upstream credential rejected, check GEMINI_API_KEY: {}", err);
                    }
                    _ => error!("Summary failed: {}", err),
                }
                JsonResponse::from_error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_bodies() {
        let ok = JsonResponse::ok("summary".to_string());
        assert_eq!(ok.status, 200);
        assert_eq!(ok.body["text"], "summary");

        let err = JsonResponse::from_error(&GatewayError::UpstreamUnknown(
            "secret upstream trace".to_string(),
        ));
        assert_eq!(err.status, 500);
        assert!(!err.body.to_string().contains("secret upstream trace"));
        assert!(err.body.get("details").is_none());
    }
}
