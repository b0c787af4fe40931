//! The graph smoke scenario.
//!
//! ```text
//! Start ──navigate──► Loaded ──trigger──► Triggered ──wait-for-nodes──► NodesVisible
//!                                                                         │
//!   Captured ◄──capture── DetailsVisible ◄──assert-details── NodeClicked ◄┘ click-node
//! ```
//!
//! Each step is a precondition for the next. The first failure ends the run
//! and is reported as [`VerifyError::StepFailed`] naming the step.

use crate::artifact::{write_screenshot, ScreenshotArtifact};
use crate::config::VerifyConfig;
use crate::driver::{PageDriver, ScreenshotOptions};
use crate::locator::{expect, Locator};
use crate::result::{VerifyError, VerifyResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// Scenario progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScenarioState {
    /// Nothing done yet
    Start,
    /// Application page loaded
    Loaded,
    /// Generate control clicked
    Triggered,
    /// At least one graph node visible
    NodesVisible,
    /// First graph node clicked
    NodeClicked,
    /// Details panel visible
    DetailsVisible,
    /// Screenshot written
    Captured,
}

/// One step of the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Open the application URL
    Navigate,
    /// Click the generate control
    Trigger,
    /// Wait for the first graph node to render
    WaitForNodes,
    /// Click the first graph node
    ClickNode,
    /// Wait for the details panel
    AssertDetails,
    /// Write the full-page screenshot
    Capture,
}

impl Step {
    /// All steps, in execution order
    pub const ALL: [Self; 6] = [
        Self::Navigate,
        Self::Trigger,
        Self::WaitForNodes,
        Self::ClickNode,
        Self::AssertDetails,
        Self::Capture,
    ];

    /// Step name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Trigger => "trigger",
            Self::WaitForNodes => "wait-for-nodes",
            Self::ClickNode => "click-node",
            Self::AssertDetails => "assert-details",
            Self::Capture => "capture",
        }
    }

    /// State reached once the step succeeds
    #[must_use]
    pub const fn reaches(self) -> ScenarioState {
        match self {
            Self::Navigate => ScenarioState::Loaded,
            Self::Trigger => ScenarioState::Triggered,
            Self::WaitForNodes => ScenarioState::NodesVisible,
            Self::ClickNode => ScenarioState::NodeClicked,
            Self::AssertDetails => ScenarioState::DetailsVisible,
            Self::Capture => ScenarioState::Captured,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Which step
    pub step: Step,
    /// Time taken
    pub elapsed_ms: u64,
    /// What was observed
    pub detail: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Application URL
    pub url: String,
    /// Completed steps in order
    pub steps: Vec<StepRecord>,
    /// Final state
    pub state: ScenarioState,
    /// Screenshot written by the last step
    pub screenshot: Option<ScreenshotArtifact>,
    /// Total run time
    pub total_ms: u64,
}

impl ScenarioReport {
    /// Whether every step completed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Captured
    }
}

/// Receives step progress, e.g. to drive terminal output
pub trait StepListener {
    /// A step is about to run
    fn step_started(&mut self, _step: Step) {}

    /// A step completed
    fn step_passed(&mut self, _record: &StepRecord) {}

    /// A step failed; the run stops
    fn step_failed(&mut self, _step: Step, _error: &VerifyError) {}
}

/// Listener that ignores all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl StepListener for NoopListener {}

/// The generate → nodes → click → details → screenshot smoke test
#[derive(Debug, Clone)]
pub struct SmokeScenario {
    config: VerifyConfig,
}

impl SmokeScenario {
    /// Create a scenario from configuration
    #[must_use]
    pub const fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Locator for the generate control
    #[must_use]
    pub fn trigger_locator(&self) -> Locator {
        Locator::text(self.config.trigger_text.clone())
            .with_timeout(self.config.element_timeout())
            .with_poll_interval(self.config.poll_interval())
    }

    /// Locator for the first graph node
    #[must_use]
    pub fn node_locator(&self) -> Locator {
        Locator::test_id_prefix(self.config.node_test_id_prefix.clone())
            .with_timeout(self.config.assertion_timeout())
            .with_poll_interval(self.config.poll_interval())
    }

    /// Locator for the details panel text
    #[must_use]
    pub fn details_locator(&self) -> Locator {
        Locator::text(self.config.details_text.clone())
            .with_timeout(self.config.assertion_timeout())
            .with_poll_interval(self.config.poll_interval())
    }

    /// Run every step against `driver`
    pub async fn run<D: PageDriver + ?Sized>(&self, driver: &mut D) -> VerifyResult<ScenarioReport> {
        self.run_with(driver, &mut NoopListener).await
    }

    /// Run every step, reporting progress to `listener`
    pub async fn run_with<D, L>(&self, driver: &mut D, listener: &mut L) -> VerifyResult<ScenarioReport>
    where
        D: PageDriver + ?Sized,
        L: StepListener + ?Sized,
    {
        let started = Instant::now();
        let mut report = ScenarioReport {
            url: self.config.url.clone(),
            steps: Vec::with_capacity(Step::ALL.len()),
            state: ScenarioState::Start,
            screenshot: None,
            total_ms: 0,
        };

        for step in Step::ALL {
            listener.step_started(step);
            tracing::info!(step = %step, "step started");
            let step_started = Instant::now();

            let detail = match self.execute(step, driver, &mut report).await {
                Ok(detail) => detail,
                Err(error) => {
                    let error = error.at_step(step);
                    tracing::error!(step = %step, error = %error, "step failed");
                    listener.step_failed(step, &error);
                    return Err(error);
                }
            };

            let record = StepRecord {
                step,
                elapsed_ms: millis(step_started.elapsed()),
                detail,
            };
            tracing::info!(step = %step, elapsed_ms = record.elapsed_ms, "step passed");
            listener.step_passed(&record);
            report.steps.push(record);
            report.state = step.reaches();
        }

        report.total_ms = millis(started.elapsed());
        Ok(report)
    }

    async fn execute<D: PageDriver + ?Sized>(
        &self,
        step: Step,
        driver: &mut D,
        report: &mut ScenarioReport,
    ) -> VerifyResult<String> {
        match step {
            Step::Navigate => {
                let url = &self.config.url;
                tokio::time::timeout(self.config.navigation_timeout(), driver.navigate(url))
                    .await
                    .map_err(|_| VerifyError::NavigationError {
                        url: url.clone(),
                        message: format!("timed out after {}ms", self.config.navigation_timeout_ms),
                    })??;
                let landed = driver.current_url().await?;
                Ok(format!("loaded {landed}"))
            }
            Step::Trigger => {
                let trigger = self.trigger_locator();
                trigger.click(&*driver).await?;
                Ok(format!("clicked {}", trigger.selector()))
            }
            Step::WaitForNodes => {
                let snapshot = expect(&self.node_locator()).to_be_visible(&*driver).await?;
                Ok(format!("{} node(s) rendered", snapshot.count))
            }
            Step::ClickNode => {
                let node = self.node_locator();
                node.click(&*driver).await?;
                Ok(format!("clicked first {}", node.selector()))
            }
            Step::AssertDetails => {
                let details = self.details_locator();
                expect(&details).to_be_visible(&*driver).await?;
                Ok(format!("{} visible", details.selector()))
            }
            Step::Capture => {
                let data = driver.screenshot(ScreenshotOptions { full_page: true }).await?;
                let artifact = write_screenshot(&self.config.screenshot_path, &data).await?;
                let detail = format!(
                    "wrote {} ({} bytes)",
                    artifact.path.display(),
                    artifact.size_bytes
                );
                report.screenshot = Some(artifact);
                Ok(detail)
            }
        }
    }

    /// Screenshot path this scenario writes to
    #[must_use]
    pub fn screenshot_path(&self) -> PathBuf {
        self.config.screenshot_path.clone()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
