//! CLI argument definitions using clap

use crate::config::{CliConfig, ColorChoice, Verbosity};
use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use clap::{Parser, ValueEnum};
use graphcheck::{BrowserConfig, VerifyConfig};
use std::path::PathBuf;
use url::{ParseError, Url};

/// Graphcheck: open the dependency graph app, generate a graph, open a
/// node, check its details panel and save a screenshot
#[derive(Parser, Debug)]
#[command(name = "graphcheck")]
#[command(author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Application URL
    #[arg(long, default_value = graphcheck::DEFAULT_URL)]
    pub url: String,

    /// Where to write the full-page screenshot
    #[arg(long, default_value = graphcheck::DEFAULT_SCREENSHOT_PATH)]
    pub screenshot: PathBuf,

    /// Element and assertion timeout in milliseconds
    #[arg(long, default_value_t = graphcheck::DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = graphcheck::DEFAULT_NAVIGATION_TIMEOUT_MS)]
    pub nav_timeout_ms: u64,

    /// Delay between visibility polls in milliseconds
    #[arg(
        long,
        default_value_t = graphcheck::DEFAULT_POLL_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_ms: u64,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the Chromium executable
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Launch Chromium without its sandbox
    #[arg(long)]
    pub no_sandbox: bool,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorArg,
}

impl Cli {
    /// Output settings derived from the flags
    #[must_use]
    pub fn cli_config(&self) -> CliConfig {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Debug,
            }
        };

        CliConfig::new()
            .with_verbosity(verbosity)
            .with_color(self.color.into())
            .with_format(self.format.into())
    }

    /// Scenario settings derived from the flags
    ///
    /// Fails if the URL is not an http(s) URL with a host, so a typo is
    /// reported before Chromium is launched.
    pub fn verify_config(&self) -> CliResult<VerifyConfig> {
        validate_url(&self.url)?;

        let mut browser = BrowserConfig::default().with_headless(!self.headed);
        if let Some(ref path) = self.chromium_path {
            browser = browser.with_chromium_path(path.to_string_lossy());
        }
        if self.no_sandbox {
            browser = browser.with_no_sandbox();
        }

        Ok(VerifyConfig::new()
            .with_url(self.url.clone())
            .with_screenshot_path(self.screenshot.clone())
            .with_timeout(self.timeout_ms)
            .with_navigation_timeout(self.nav_timeout_ms)
            .with_poll_interval(self.poll_ms)
            .with_browser(browser))
    }
}

fn validate_url(raw: &str) -> CliResult<()> {
    let parsed = Url::parse(raw).map_err(|e| match e {
        ParseError::EmptyHost => {
            CliError::invalid_argument(format!("--url has no host: '{raw}'"))
        }
        other => {
            CliError::invalid_argument(format!("--url is not a valid URL: '{raw}' ({other})"))
        }
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CliError::invalid_argument(format!(
            "--url must start with http:// or https://, got '{raw}'"
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(CliError::invalid_argument(format!(
            "--url has no host: '{raw}'"
        )));
    }
    Ok(())
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Step lines and a summary
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
