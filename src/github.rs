//! Repository search pass-through to the GitHub REST API.

use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{error, info};

use crate::core::config::AppConfig;
use crate::core::models::{JsonResponse, SearchQuery};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("reporadar/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
});

impl SearchQuery {
    /// Builds a query from request parameters, applying the search defaults.
    /// Returns `None` when `q` is missing or blank.
    pub fn from_params<'a, F>(param: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let non_blank = |name: &str| param(name).map(str::trim).filter(|v| !v.is_empty());

        Some(Self {
            q: non_blank("q")?.to_string(),
            sort: non_blank("sort").unwrap_or("stars").to_string(),
            order: non_blank("order").unwrap_or("desc").to_string(),
            per_page: non_blank("per_page").unwrap_or("10").to_string(),
            page: non_blank("page").map(ToString::to_string),
        })
    }

    fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("q", self.q.as_str()),
            ("sort", self.sort.as_str()),
            ("order", self.order.as_str()),
            ("per_page", self.per_page.as_str()),
        ];
        if let Some(page) = &self.page {
            pairs.push(("page", page.as_str()));
        }
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    #[must_use]
    pub fn new(token: Option<String>, base_url: String) -> Self {
        Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.github_token.clone(), GITHUB_API_BASE.to_string())
    }

    /// Forwards `query` to `/search/repositories` and relays the result.
    pub async fn search_repositories(&self, query: &SearchQuery) -> JsonResponse {
        info!(sort = %query.sort, order = %query.order, per_page = %query.per_page, "Searching repositories");

        let mut request = HTTP_CLIENT
            .get(format!("{}/search/repositories", self.base_url))
            .header("Accept", "application/vnd.github.v3+json")
            .query(&query.pairs());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                error!("GitHub search request failed: {}", e);
                return internal_error();
            }
        };

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                error!("Failed to parse GitHub search response: {}", e);
                return internal_error();
            }
            Err(_) => Value::Null,
        };

        if status.is_success() {
            return JsonResponse {
                status: 200,
                body,
            };
        }

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(
                || status.canonical_reason().unwrap_or("GitHub request failed").to_string(),
                ToString::to_string,
            );
        JsonResponse {
            status: status.as_u16(),
            body: json!({ "error": message }),
        }
    }
}

fn internal_error() -> JsonResponse {
    JsonResponse::error(500, "Internal Server Error".to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn query(pairs: &[(&'static str, &'static str)]) -> Option<SearchQuery> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        SearchQuery::from_params(|name| map.get(name).copied())
    }

    #[test]
    fn test_defaults_applied() {
        let q = query(&[("q", "rust cli")]).unwrap();
        assert_eq!(q.q, "rust cli");
        assert_eq!(q.sort, "stars");
        assert_eq!(q.order, "desc");
        assert_eq!(q.per_page, "10");
        assert_eq!(q.page, None);
    }

    #[test]
    fn test_missing_or_blank_q_rejected() {
        assert!(query(&[]).is_none());
        assert!(query(&[("q", "   ")]).is_none());
    }

    #[test]
    fn test_pairs_include_page_when_set() {
        let q = query(&[("q", "x"), ("page", "3"), ("sort", "updated")]).unwrap();
        let pairs = q.pairs();
        assert!(pairs.contains(&("page", "3")));
        assert!(pairs.contains(&("sort", "updated")));
    }
}
