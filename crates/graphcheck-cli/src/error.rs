//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Binary built without browser support
    #[error("Browser support not enabled: {message}")]
    BrowserUnavailable {
        /// Error message
        message: String,
    },

    /// The smoke scenario failed
    #[error("Verification failed: {0}")]
    Verify(#[from] graphcheck::VerifyError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON report error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a browser unavailable error
    #[must_use]
    pub fn browser_unavailable(message: impl Into<String>) -> Self {
        Self::BrowserUnavailable {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use graphcheck::{Step, VerifyError};

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad url");
        assert!(err.to_string().contains("Invalid argument"));
        assert!(err.to_string().contains("bad url"));
    }

    #[test]
    fn test_browser_unavailable_error() {
        let err = CliError::browser_unavailable("rebuild with --features browser");
        assert!(err.to_string().contains("Browser support"));
    }

    #[test]
    fn test_verify_error_from_keeps_step() {
        let inner = VerifyError::ElementNotFound {
            selector: "text \"Generate Random\"".to_string(),
            timeout_ms: 5000,
        }
        .at_step(Step::Trigger);
        let err: CliError = inner.into();
        let message = err.to_string();
        assert!(message.contains("Verification failed"));
        assert!(message.contains("trigger"));
        assert!(message.contains("Generate Random"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
