//! Output formatting and progress reporting

use crate::error::CliResult;
use console::{style, Term};
use graphcheck::{ScenarioReport, Step, StepListener, StepRecord, VerifyError};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress reporter for the scenario steps
///
/// Shows a spinner while a step runs and one line per finished step on
/// stderr, so stdout only carries the report.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    fn start_spinner(&mut self, message: String) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

impl StepListener for ProgressReporter {
    fn step_started(&mut self, step: Step) {
        self.start_spinner(format!("{step}..."));
    }

    fn step_passed(&mut self, record: &StepRecord) {
        self.clear_spinner();
        self.success(&format_step_line(record));
    }

    fn step_failed(&mut self, step: Step, error: &VerifyError) {
        self.clear_spinner();
        self.failure(&format!("{step}: {}", root_message(error)));
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

fn format_step_line(record: &StepRecord) -> String {
    format!("{:<15} {:>6}ms  {}", record.step, record.elapsed_ms, record.detail)
}

/// The error without its step wrapper
fn root_message(error: &VerifyError) -> String {
    match error {
        VerifyError::StepFailed { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

/// Render a successful run as text
#[must_use]
pub fn render_report_text(report: &ScenarioReport, use_color: bool) -> String {
    let status = if use_color {
        style("PASSED").green().bold().to_string()
    } else {
        "PASSED".to_string()
    };

    let mut out = format!(
        "{status} {} steps against {} in {:.2}s\n",
        report.steps.len(),
        report.url,
        Duration::from_millis(report.total_ms).as_secs_f64()
    );
    if let Some(ref screenshot) = report.screenshot {
        out.push_str(&format!(
            "Screenshot: {} ({} bytes)\n",
            screenshot.path.display(),
            screenshot.size_bytes
        ));
    }
    out
}

/// Render a successful run as JSON
pub fn render_report_json(report: &ScenarioReport) -> CliResult<String> {
    let mut value = serde_json::to_value(report)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("passed".to_string(), serde_json::Value::Bool(report.passed()));
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Render a failed run as JSON
pub fn render_failure_json(url: &str, error: &VerifyError) -> CliResult<String> {
    let value = serde_json::json!({
        "passed": false,
        "url": url,
        "step": error.step(),
        "kind": error.kind().to_string(),
        "error": root_message(error),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
