//! Bounded retry around a single upstream completion call.
//!
//! Failures are classified per attempt. Temporary overload is retried after a
//! backoff delay; credential failures and unrecognized failures end the
//! invocation immediately unless the policy opts into retrying unknowns.

use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::{error, info, warn};

use super::client::{CompletionApi, UpstreamError};

/// Why an invocation ended without text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Every attempt hit temporary overload.
    Overloaded,
    /// The upstream rejected the configured credential.
    Unauthorized,
    Unknown,
}

/// Result of one upstream attempt, or of a whole invocation.
///
/// [`invoke_with_retry`] never returns `TransientFailure`: exhausted
/// transient failures surface as `TerminalFailure(Overloaded, ..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    Success(String),
    TransientFailure(String),
    TerminalFailure(FailureKind, String),
}

impl UpstreamOutcome {
    /// Maps a raw attempt result onto an outcome.
    #[must_use]
    pub fn from_attempt(result: Result<String, UpstreamError>) -> Self {
        match result {
            Ok(text) => UpstreamOutcome::Success(text),
            Err(err) => match classify(&err) {
                AttemptClass::Transient => UpstreamOutcome::TransientFailure(err.to_string()),
                AttemptClass::Unauthorized => {
                    UpstreamOutcome::TerminalFailure(FailureKind::Unauthorized, err.to_string())
                }
                AttemptClass::Unknown => {
                    UpstreamOutcome::TerminalFailure(FailureKind::Unknown, err.to_string())
                }
            },
        }
    }

    fn should_retry(&self, retry_unknown: bool) -> bool {
        match self {
            UpstreamOutcome::TransientFailure(_) => true,
            UpstreamOutcome::TerminalFailure(FailureKind::Unknown, _) => retry_unknown,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptClass {
    Transient,
    Unauthorized,
    Unknown,
}

const TRANSIENT_MARKERS: &[&str] = &["503", "overloaded"];
const UNAUTHORIZED_MARKERS: &[&str] = &["401", "api key not valid", "invalid api key"];

/// Classifies one failed attempt.
///
/// The HTTP status is consulted first; the message substrings are a fallback
/// for failures that carry no status. Anything unrecognized is `Unknown`,
/// never assumed transient.
#[must_use]
pub fn classify(err: &UpstreamError) -> AttemptClass {
    let lowered = err.message.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));

    match err.status {
        Some(503) => return AttemptClass::Transient,
        Some(401) => return AttemptClass::Unauthorized,
        Some(403) if mentions(UNAUTHORIZED_MARKERS) => return AttemptClass::Unauthorized,
        _ => {}
    }

    if mentions(TRANSIENT_MARKERS) {
        AttemptClass::Transient
    } else if mentions(UNAUTHORIZED_MARKERS) {
        AttemptClass::Unauthorized
    } else {
        AttemptClass::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// Delay multiplied by the number of the attempt that just failed.
    Linear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first call included.
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
    /// Also retry failures that are neither transient nor unauthorized.
    pub retry_unknown: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(2000),
            backoff: Backoff::Fixed,
            retry_unknown: false,
        }
    }
}

impl RetryPolicy {
    /// Delays slept between attempts; one fewer than `max_attempts`.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        (1..self.max_attempts.max(1))
            .map(|attempt| match self.backoff {
                Backoff::Fixed => self.delay,
                Backoff::Linear => self.delay.saturating_mul(attempt),
            })
            .collect()
    }
}

/// Calls `api` until it succeeds, fails terminally, or the attempt budget
/// runs out.
pub async fn invoke_with_retry(
    api: &dyn CompletionApi,
    prompt: &str,
    policy: &RetryPolicy,
) -> UpstreamOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 0;

    let result = RetryIf::start(
        policy.delays(),
        || {
            attempt += 1;
            let current = attempt;
            async move {
                match UpstreamOutcome::from_attempt(api.generate(prompt).await) {
                    UpstreamOutcome::Success(text) => Ok((current, text)),
                    failure => {
                        warn!(
                            attempt = current,
                            max_attempts,
                            outcome = ?failure,
                            "Upstream attempt failed"
                        );
                        Err(failure)
                    }
                }
            }
        },
        |failure: &UpstreamOutcome| failure.should_retry(policy.retry_unknown),
    )
    .await;

    match result {
        Ok((attempts, text)) => {
            info!(attempts, "Upstream call succeeded");
            UpstreamOutcome::Success(text)
        }
        Err(UpstreamOutcome::TransientFailure(message)) => {
            warn!(max_attempts, "Upstream still overloaded after all attempts");
            UpstreamOutcome::TerminalFailure(FailureKind::Overloaded, message)
        }
        Err(failure) => {
            if let UpstreamOutcome::TerminalFailure(FailureKind::Unknown, message) = &failure {
                error!(error = %message, "Unclassified upstream failure");
            }
            failure
        }
    }
}
