/// RepoRadar - the server-side gateway behind the RepoRadar repository browser.
///
/// The browser searches GitHub repositories and asks for an AI summary of a
/// repository's README. This crate implements the server half as a single
/// AWS Lambda function:
/// 1. `POST /gateway/summarize` throttles the caller, redacts prompt-injection
///    phrases from the repository fields, and asks Gemini for a summary with
///    bounded retry on overload
/// 2. `GET /github/search` forwards repository searches to the GitHub REST API
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda (function URL / HTTP API) via `lambda_runtime`
/// - an Aho-Corasick automaton for single-pass pattern detection
/// - a `DashMap` of fixed-window counters for per-client throttling
/// - `reqwest` for the Gemini and GitHub calls, `tokio-retry` for backoff
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use reporadar::core::models::RequestBody;
/// use reporadar::gateway::Gateway;
/// use reporadar::core::config::AppConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     reporadar::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let gateway = Gateway::from_config(&config);
///
///     let body = r#"{"repoData":{"full_name":"octo/repo","description":"A demo"}}"#;
///     let response = gateway
///         .handle(
///             "203.0.113.7",
///             RequestBody {
///                 body: Some(body),
///                 is_base64_encoded: false,
///             },
///         )
///         .await;
///     println!("{} {}", response.status, response.body);
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod gateway;
pub mod github;
pub mod limits;
pub mod prompt;

pub use errors::GatewayError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration, filtered by `RUST_LOG` (default `info`).
/// Repeated calls are harmless; only the first installs the subscriber.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// reporadar::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
