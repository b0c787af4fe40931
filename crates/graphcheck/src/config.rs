//! Scenario configuration.

use crate::browser::BrowserConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the application under test is served
pub const DEFAULT_URL: &str = "http://localhost:5173";

/// Where the final screenshot is written
pub const DEFAULT_SCREENSHOT_PATH: &str = "verification/app_verification.png";

/// Text of the control that generates a random graph
pub const DEFAULT_TRIGGER_TEXT: &str = "Generate Random";

/// `data-testid` prefix of rendered graph nodes
pub const DEFAULT_NODE_TEST_ID_PREFIX: &str = "node-";

/// Text shown by the details panel of a selected node
pub const DEFAULT_DETAILS_TEXT: &str = "Release Management";

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Scenario configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Application URL
    pub url: String,
    /// Screenshot output path
    pub screenshot_path: PathBuf,
    /// Text of the generate control
    pub trigger_text: String,
    /// Test ID prefix of graph nodes
    pub node_test_id_prefix: String,
    /// Text expected in the details panel
    pub details_text: String,
    /// How long to wait for an element to exist before clicking it
    pub element_timeout_ms: u64,
    /// How long a visibility assertion may poll
    pub assertion_timeout_ms: u64,
    /// How long navigation may take
    pub navigation_timeout_ms: u64,
    /// Delay between polls
    pub poll_interval_ms: u64,
    /// Browser settings
    pub browser: BrowserConfig,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            screenshot_path: PathBuf::from(DEFAULT_SCREENSHOT_PATH),
            trigger_text: DEFAULT_TRIGGER_TEXT.to_string(),
            node_test_id_prefix: DEFAULT_NODE_TEST_ID_PREFIX.to_string(),
            details_text: DEFAULT_DETAILS_TEXT.to_string(),
            element_timeout_ms: crate::wait::DEFAULT_TIMEOUT_MS,
            assertion_timeout_ms: crate::wait::DEFAULT_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: crate::wait::DEFAULT_POLL_INTERVAL_MS,
            browser: BrowserConfig::default(),
        }
    }
}

impl VerifyConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the screenshot path
    #[must_use]
    pub fn with_screenshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot_path = path.into();
        self
    }

    /// Set both the element and the assertion timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.element_timeout_ms = timeout_ms;
        self.assertion_timeout_ms = timeout_ms;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the browser configuration
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Element timeout as Duration
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Assertion timeout as Duration
    #[must_use]
    pub const fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    /// Navigation timeout as Duration
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
