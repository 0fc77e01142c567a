//! # Publisher Errors

use thiserror::Error;

/// Result type for chat platform calls
pub type PublishResult<T> = Result<T, PublishError>;

/// Chat platform errors
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Gateway did not become ready within {0}ms")]
    GatewayTimeout(u64),

    #[error("Channel {0} not found")]
    ChannelNotFound(String),
}

impl PublishError {
    /// Short machine-readable kind for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::Http { .. } => "http",
            PublishError::Request(_) => "request",
            PublishError::Decode(_) => "decode",
            PublishError::Gateway(_) => "gateway",
            PublishError::GatewayTimeout(_) => "gateway_timeout",
            PublishError::ChannelNotFound(_) => "channel_not_found",
        }
    }

    /// Token rejected by the platform; retrying the same call cannot succeed
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PublishError::Http { status: 401, .. })
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PublishError::Decode(e.to_string())
        } else {
            PublishError::Request(e.to_string())
        }
    }
}
