//! Request throttling for the summarization gateway.

pub mod rate_limiter;

pub use rate_limiter::{RateLimitConfig, RateLimiter};

use sha2::{Digest, Sha256};

/// Shared identifier for callers that sent no usable address hint.
/// Every such caller draws from the same budget.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Short, stable hash of a client identifier for log fields.
#[must_use]
pub fn client_fingerprint(client_id: &str) -> String {
    let digest = Sha256::digest(client_id.as_bytes());
    hex::encode(digest)[..12].to_string()
}
