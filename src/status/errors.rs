//! # Status Errors

use thiserror::Error;

/// Result type for status API calls
pub type FetchResult<T> = Result<T, FetchError>;

/// Ways a status request can fail
///
/// These never leave the fetcher: every variant degrades to an offline reading.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Client setup failed: {0}")]
    Client(String),
}

impl FetchError {
    /// Short machine-readable kind for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Request(_) => "request",
            FetchError::HttpStatus(_) => "http_status",
            FetchError::MalformedPayload(_) => "malformed_payload",
            FetchError::Client(_) => "client",
        }
    }
}
