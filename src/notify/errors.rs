//! # Notification Errors

use thiserror::Error;

/// Result type for notification delivery
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Webhook delivery errors
///
/// Delivery is best effort: callers log these and move on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Webhook returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Webhook request failed: {0}")]
    Request(String),

    #[error("Webhook client setup failed: {0}")]
    Client(String),
}

impl NotifyError {
    /// Short machine-readable kind for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyError::Rejected { .. } => "rejected",
            NotifyError::Request(_) => "request",
            NotifyError::Client(_) => "client",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = NotifyError::Rejected {
            status: 404,
            body: "Unknown Webhook".to_string(),
        };
        assert_eq!(err.kind(), "rejected");
        assert_eq!(err.to_string(), "Webhook returned HTTP 404: Unknown Webhook");
    }
}
