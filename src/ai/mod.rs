//! Upstream completion API access

pub mod client;
pub mod retry;

// Re-export main types for convenience
pub use client::{CompletionApi, GeminiClient, UpstreamError};
pub use retry::{Backoff, FailureKind, RetryPolicy, UpstreamOutcome, invoke_with_retry};
