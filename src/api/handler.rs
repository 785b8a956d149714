//! API Lambda handler - thin router in front of the gateway.
//!
//! This module handles:
//! - Route and method dispatch
//! - Client identification for throttling
//! - Summary requests (delegated to [`Gateway`])
//! - Repository search (delegated to [`GitHubClient`])

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::core::config::AppConfig;
use crate::core::models::{JsonResponse, SearchQuery};
use crate::gateway::Gateway;
use crate::github::GitHubClient;
use crate::limits::client_fingerprint;

pub const SUMMARIZE_PATH: &str = "/gateway/summarize";
pub const SEARCH_PATH: &str = "/github/search";

/// Everything built once per container and shared by every invocation.
pub struct AppState {
    pub gateway: Gateway,
    pub github: GitHubClient,
}

impl AppState {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            gateway: Gateway::from_config(config),
            github: GitHubClient::from_config(config),
        }
    }
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never fails for request-level problems; those become JSON error
/// responses. The `Result` exists to satisfy the runtime contract.
pub async fn function_handler(
    state: &AppState,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(route(state, &event.payload).await)
}

/// Dispatches one HTTP event and returns the response envelope.
pub async fn route(state: &AppState, payload: &Value) -> Value {
    let request_id = Uuid::new_v4().to_string();
    let method = parsing::request_method(payload);
    let path = parsing::request_path(payload).unwrap_or("/").to_string();
    let client_id = parsing::client_id(payload);

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        client = %client_fingerprint(&client_id),
    );

    async {
        info!("API Lambda received request");

        let response = if path.ends_with(SUMMARIZE_PATH) {
            if method == "POST" {
                state
                    .gateway
                    .handle(&client_id, parsing::request_body(payload))
                    .await
            } else {
                method_not_allowed(&method)
            }
        } else if path.ends_with(SEARCH_PATH) {
            if method == "GET" {
                search(state, payload).await
            } else {
                method_not_allowed(&method)
            }
        } else {
            warn!("No route for path");
            JsonResponse::error(404, "Not found".to_string(), None)
        };

        let response = with_request_id(response, &request_id);
        info!(status = response.status, "Request completed");
        helpers::from_json_response(&response)
    }
    .instrument(span)
    .await
}

const SEARCH_PARAMS: [&str; 5] = ["q", "sort", "order", "per_page", "page"];

async fn search(state: &AppState, payload: &Value) -> JsonResponse {
    let params: Vec<(&str, Option<String>)> = SEARCH_PARAMS
        .into_iter()
        .map(|name| (name, parsing::query_param(payload, name)))
        .collect();

    let query = SearchQuery::from_params(|name| {
        params
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_deref())
    });

    match query {
        Some(query) => state.github.search_repositories(&query).await,
        None => JsonResponse::error(400, "Query parameter 'q' is required".to_string(), None),
    }
}

fn method_not_allowed(method: &str) -> JsonResponse {
    JsonResponse::error(405, format!("Method {method} not allowed"), None)
}

/// Attaches the request id to server-side failures so callers can quote it.
fn with_request_id(mut response: JsonResponse, request_id: &str) -> JsonResponse {
    if response.status >= 500 && response.status != 503 {
        if let Some(obj) = response.body.as_object_mut() {
            obj.entry("details")
                .or_insert_with(|| Value::String(format!("request_id={request_id}")));
        }
    }
    response
}
