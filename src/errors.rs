use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded for client {0}")]
    RateLimited(String),

    #[error("Upstream rejected credentials: {0}")]
    UpstreamUnauthorized(String),

    #[error("Upstream overloaded after {attempts} attempts: {message}")]
    UpstreamOverloaded { attempts: u32, message: String },

    #[error("Upstream failed: {0}")]
    UpstreamUnknown(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl GatewayError {
    /// HTTP status returned to the browser for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::InvalidInput(_) => 400,
            GatewayError::RateLimited(_) => 429,
            GatewayError::UpstreamUnauthorized(_) => 401,
            GatewayError::UpstreamOverloaded { .. } => 503,
            GatewayError::UpstreamUnknown(_) | GatewayError::ConfigError(_) => 500,
        }
    }

    /// Message safe to hand back to an untrusted caller.
    ///
    /// Upstream and transport details stay in the server logs.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::InvalidInput(msg) => msg.clone(),
            GatewayError::RateLimited(_) => {
                "Too many requests. Please wait a bit before retrying.".to_string()
            }
            GatewayError::UpstreamUnauthorized(_) => {
                "The summarization service rejected its credentials.".to_string()
            }
            GatewayError::UpstreamOverloaded { .. } => {
                "Summarization service temporarily overloaded.".to_string()
            }
            GatewayError::UpstreamUnknown(_) | GatewayError::ConfigError(_) => {
                "Failed to generate summary.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::InvalidInput(format!("Malformed JSON body: {error}"))
    }
}
