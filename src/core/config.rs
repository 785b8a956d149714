use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::ai::retry::{Backoff, RetryPolicy};
use crate::errors::GatewayError;
use crate::limits::RateLimitConfig;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub github_token: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` when the API key is missing or a numeric
    /// override does not parse to a positive value.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests can avoid
    /// mutating the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::ConfigError("GEMINI_API_KEY is not set".to_string()))?;

        let window_secs: u64 = positive(&lookup, "RATE_LIMIT_WINDOW_SECS", 60)?;
        let max_requests: u32 = positive(&lookup, "RATE_LIMIT_MAX_REQUESTS", 5)?;
        let max_clients: usize = positive(&lookup, "RATE_LIMIT_MAX_CLIENTS", 10_000)?;
        let max_attempts: u32 = positive(&lookup, "UPSTREAM_MAX_ATTEMPTS", 3)?;
        let delay_ms: u64 = parse_or(&lookup, "UPSTREAM_RETRY_DELAY_MS", 2000)?;

        let backoff = match lookup("UPSTREAM_BACKOFF").as_deref().map(str::trim) {
            None | Some("" | "fixed") => Backoff::Fixed,
            Some("linear") => Backoff::Linear,
            Some(other) => {
                return Err(GatewayError::ConfigError(format!(
                    "UPSTREAM_BACKOFF: expected 'fixed' or 'linear', got '{other}'"
                )));
            }
        };

        let retry_unknown = match lookup("UPSTREAM_RETRY_UNKNOWN").as_deref().map(str::trim) {
            None | Some("") => false,
            Some(v) => v.parse::<bool>().map_err(|e| {
                GatewayError::ConfigError(format!("UPSTREAM_RETRY_UNKNOWN: {e}"))
            })?,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            github_token: lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty()),
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(window_secs),
                max_requests,
                max_tracked_clients: max_clients,
            },
            retry: RetryPolicy {
                max_attempts,
                delay: Duration::from_millis(delay_ms),
                backoff,
                retry_unknown,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, GatewayError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| GatewayError::ConfigError(format!("{key}: {e}"))),
        _ => Ok(default),
    }
}

fn positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, GatewayError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value = parse_or(lookup, key, default)?;
    if value == T::default() {
        return Err(GatewayError::ConfigError(format!("{key}: must be greater than zero")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_millis(2000));
        assert_eq!(config.retry.backoff, Backoff::Fixed);
        assert!(!config.retry.retry_unknown);
        assert!(config.github_token.is_none());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, GatewayError::ConfigError(_)));
    }

    #[test]
    fn test_overrides_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("RATE_LIMIT_WINDOW_SECS", "30"),
            ("RATE_LIMIT_MAX_REQUESTS", "10"),
            ("UPSTREAM_MAX_ATTEMPTS", "4"),
            ("UPSTREAM_RETRY_DELAY_MS", "200"),
            ("UPSTREAM_BACKOFF", "linear"),
            ("UPSTREAM_RETRY_UNKNOWN", "true"),
        ]))
        .unwrap();
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.backoff, Backoff::Linear);
        assert!(config.retry.retry_unknown);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("RATE_LIMIT_MAX_REQUESTS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_MAX_REQUESTS"));
    }

    #[test]
    fn test_garbage_number_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("UPSTREAM_MAX_ATTEMPTS", "three"),
        ]))
        .unwrap_err();
        assert!(matches!(err, GatewayError::ConfigError(_)));
    }
}
