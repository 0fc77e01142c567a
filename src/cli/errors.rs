//! CLI-specific error types
//!
//! Every CLI error ends the process with exit code 1.

use std::io;

use thiserror::Error;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Missing or invalid configuration
    ConfigError,
    /// I/O error (env file, stdout)
    IoError,
    /// Startup could not complete
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "BOT_CLI_CONFIG_ERROR",
            Self::IoError => "BOT_CLI_IO_ERROR",
            Self::BootFailed => "BOT_CLI_BOOT_FAILED",
        }
    }
}

/// Error that ends the process, tagged with a stable code
#[derive(Debug, Error)]
#[error("{}: {message}", .code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing or invalid configuration
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Env file or stdout failure
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Discord login or client setup failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("Could not encode output: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::config_error("BOT_TOKEN is required");
        assert_eq!(err.code(), CliErrorCode::ConfigError);
        assert_eq!(err.to_string(), "BOT_CLI_CONFIG_ERROR: BOT_TOKEN is required");
    }

    #[test]
    fn test_io_conversion() {
        let err: CliError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.code_str(), "BOT_CLI_IO_ERROR");
        assert_eq!(err.message(), "gone");
    }
}
