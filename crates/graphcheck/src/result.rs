//! Result and error types for Graphcheck.

use crate::scenario::Step;
use thiserror::Error;

/// Result type for Graphcheck operations
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Coarse classification of a failure.
///
/// Every run failure is fatal; the kind only tells the operator where to
/// look (server down, UI did not render, or local environment broken).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Target URL unreachable
    Navigation,
    /// An element did not appear or become visible in time
    Timeout,
    /// Browser, page, input, filesystem or screenshot failure
    Resource,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Navigation => "navigation",
            Self::Timeout => "timeout",
            Self::Resource => "resource",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur in Graphcheck
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched a selector before the deadline
    #[error("No element matching {selector} found within {timeout_ms}ms")]
    ElementNotFound {
        /// Selector description
        selector: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// A polled assertion never held
    #[error("Timed out after {timeout_ms}ms waiting for {condition} (last state: {last_state})")]
    AssertionTimeout {
        /// Description of the awaited condition
        condition: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Last observed state
        last_state: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// A scenario step failed
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        /// The step that failed
        step: Step,
        /// Underlying error
        #[source]
        source: Box<VerifyError>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VerifyError {
    /// Wrap an error with the step it occurred in
    #[must_use]
    pub fn at_step(self, step: Step) -> Self {
        Self::StepFailed {
            step,
            source: Box::new(self),
        }
    }

    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NavigationError { .. } => ErrorKind::Navigation,
            Self::ElementNotFound { .. } | Self::AssertionTimeout { .. } => ErrorKind::Timeout,
            Self::StepFailed { source, .. } => source.kind(),
            Self::BrowserLaunchError { .. }
            | Self::PageError { .. }
            | Self::ScriptError { .. }
            | Self::InputError { .. }
            | Self::ScreenshotError { .. }
            | Self::InvalidState { .. }
            | Self::Io(_) => ErrorKind::Resource,
        }
    }

    /// The step a failure is attributed to, if any
    #[must_use]
    pub const fn step(&self) -> Option<Step> {
        match self {
            Self::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}
