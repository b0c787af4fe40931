//! Smoke run orchestration

use crate::config::{CliConfig, Verbosity};
use crate::error::{CliError, CliResult};
use crate::output::{
    render_failure_json, render_report_json, render_report_text, OutputFormat, ProgressReporter,
};
use graphcheck::{ScenarioReport, SmokeScenario, VerifyConfig};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber for `verbosity`
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_tracing(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(verbosity.filter_directive()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs the smoke scenario once and prints its report
#[derive(Debug)]
pub struct SmokeRunner {
    config: CliConfig,
    scenario: SmokeScenario,
}

impl SmokeRunner {
    /// Create a runner
    #[must_use]
    pub const fn new(config: CliConfig, verify: VerifyConfig) -> Self {
        Self {
            config,
            scenario: SmokeScenario::new(verify),
        }
    }

    /// CLI configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// The scenario this runner drives
    #[must_use]
    pub const fn scenario(&self) -> &SmokeScenario {
        &self.scenario
    }

    /// Launch Chromium, run every step, and print the report to stdout
    ///
    /// The browser is closed before this returns, whatever the outcome.
    pub fn run(&self) -> CliResult<ScenarioReport> {
        let use_color = self.config.color.should_color();
        let mut reporter = ProgressReporter::new(use_color, self.config.verbosity.is_quiet());
        reporter.info(&format!("Checking {}", self.scenario.config().url));
        self.log_start();

        let outcome = self.execute(&mut reporter);
        drop(reporter);

        match outcome {
            Ok(report) => {
                self.print_report(&report, use_color)?;
                Ok(report)
            }
            Err(CliError::Verify(error)) => {
                if self.config.format == OutputFormat::Json {
                    println!("{}", render_failure_json(&self.scenario.config().url, &error)?);
                }
                Err(CliError::Verify(error))
            }
            Err(other) => Err(other),
        }
    }

    fn log_start(&self) {
        let verify = self.scenario.config();
        tracing::info!(
            url = %verify.url,
            headless = verify.browser.headless,
            screenshot = %verify.screenshot_path.display(),
            format = ?self.config.format,
            "starting smoke run"
        );
    }

    #[cfg(feature = "browser")]
    fn execute(&self, reporter: &mut ProgressReporter) -> CliResult<ScenarioReport> {
        let rt = tokio::runtime::Runtime::new()?;
        match rt.block_on(graphcheck::run_in_browser(&self.scenario, reporter)) {
            Ok(report) => {
                tracing::info!(total_ms = report.total_ms, "smoke run passed");
                Ok(report)
            }
            Err(error) => {
                tracing::warn!(kind = %error.kind(), step = ?error.step(), "smoke run failed");
                Err(error.into())
            }
        }
    }

    #[cfg(not(feature = "browser"))]
    fn execute(&self, _reporter: &mut ProgressReporter) -> CliResult<ScenarioReport> {
        Err(CliError::browser_unavailable(
            "rebuild graphcheck-cli with --features browser",
        ))
    }

    fn print_report(&self, report: &ScenarioReport, use_color: bool) -> CliResult<()> {
        match self.config.format {
            OutputFormat::Text => {
                if !self.config.verbosity.is_quiet() {
                    print!("{}", render_report_text(report, use_color));
                }
            }
            OutputFormat::Json => println!("{}", render_report_json(report)?),
        }
        Ok(())
    }
}
