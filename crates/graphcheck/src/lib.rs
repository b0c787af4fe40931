//! Graphcheck: browser smoke test for the dependency graph web app
//!
//! Drives one page through a fixed scenario: open the app, generate a
//! random graph, wait for the nodes to render, open the first node, check
//! that its details panel appears, and save a full-page screenshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Smoke      │    │ Locator /  │    │ PageDriver         │    │
//! │   │ Scenario   │───►│ expect()   │───►│  Page (chromium)   │    │
//! │   │            │    │ bounded    │    │  MockDriver (test) │    │
//! │   └────────────┘    │ waits      │    └────────────────────┘    │
//! │                     └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "browser")]
//! # async fn demo() -> graphcheck::VerifyResult<()> {
//! use graphcheck::{run_in_browser, NoopListener, SmokeScenario, VerifyConfig};
//!
//! let scenario = SmokeScenario::new(VerifyConfig::default());
//! let report = run_in_browser(&scenario, &mut NoopListener).await?;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod artifact;
mod browser;
mod config;
mod driver;
mod locator;
mod result;
mod scenario;
mod session;
pub mod wait;

pub use artifact::{write_screenshot, ScreenshotArtifact};
#[cfg(feature = "browser")]
pub use browser::{Browser, Page};
pub use browser::BrowserConfig;
pub use config::{
    VerifyConfig, DEFAULT_DETAILS_TEXT, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_NODE_TEST_ID_PREFIX,
    DEFAULT_SCREENSHOT_PATH, DEFAULT_TRIGGER_TEXT, DEFAULT_URL,
};
pub use driver::{MockDriver, MockElement, PageDriver, ScreenshotOptions, PNG_SIGNATURE};
pub use locator::{
    expect, BoundingBox, ClickTarget, ElementSnapshot, Expect, Locator, LocatorOptions, Point,
    Selector, TEST_ID_ATTRIBUTE,
};
pub use result::{ErrorKind, VerifyError, VerifyResult};
pub use scenario::{
    NoopListener, ScenarioReport, ScenarioState, SmokeScenario, Step, StepListener, StepRecord,
};
#[cfg(feature = "browser")]
pub use session::run_in_browser;
pub use session::run_guarded;
pub use wait::{
    poll_until, Check, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
