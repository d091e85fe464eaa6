use thiserror::Error;

/// Errors raised by completion backends.
///
/// Only `Config` ever reaches a caller of the public client; everything else
/// is logged and folded into the degraded response.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::RequestFailed(format!("timed out: {}", e))
        } else {
            LlmError::RequestFailed(e.to_string())
        }
    }
}
