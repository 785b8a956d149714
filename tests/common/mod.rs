#![allow(dead_code)]

use async_trait::async_trait;
use reporadar::ai::{Backoff, CompletionApi, RetryPolicy, UpstreamError};
use reporadar::gateway::Gateway;
use reporadar::limits::{RateLimitConfig, RateLimiter};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Upstream stub that replays a fixed script of results, then repeats the
/// fallback forever. Records every prompt it receives.
pub struct ScriptedUpstream {
    script: Mutex<VecDeque<Result<String, UpstreamError>>>,
    fallback: Result<String, UpstreamError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    pub fn new(
        script: Vec<Result<String, UpstreamError>>,
        fallback: Result<String, UpstreamError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_ok(text: &str) -> Self {
        Self::new(Vec::new(), Ok(text.to_string()))
    }

    pub fn always_err(status: Option<u16>, message: &str) -> Self {
        Self::new(Vec::new(), Err(UpstreamError::new(status, message)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionApi for ScriptedUpstream {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        delay: Duration::from_millis(20),
        backoff: Backoff::Fixed,
        retry_unknown: false,
    }
}

pub fn gateway_with(upstream: Arc<ScriptedUpstream>, max_requests: u32) -> Gateway {
    Gateway::new(
        RateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests,
            max_tracked_clients: 1_000,
        }),
        upstream,
        fast_retry(3),
    )
}

pub fn summarize_body(full_name: &str, description: &str) -> String {
    serde_json::json!({
        "repoData": {
            "full_name": full_name,
            "description": description,
            "stars": 1234,
            "language": "Rust",
            "readme": "# Demo\nA small demo project."
        }
    })
    .to_string()
}
