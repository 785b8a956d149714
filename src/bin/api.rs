use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use reporadar::api::{AppState, handler};
use reporadar::core::config::AppConfig;
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reporadar::setup_logging();

    let config = AppConfig::from_env().context("loading gateway configuration")?;
    info!(
        model = %config.gemini_model,
        window_secs = config.rate_limit.window.as_secs(),
        max_requests = config.rate_limit.max_requests,
        max_attempts = config.retry.max_attempts,
        "Gateway configured"
    );

    // Built once so the rate limiter outlives individual invocations.
    let state = Arc::new(AppState::from_config(&config));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let state = Arc::clone(&state);
        async move { handler(&state, event).await }
    }))
    .await
}
