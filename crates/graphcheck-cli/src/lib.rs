//! Graphcheck CLI Library
//!
//! Command-line front end for the graph smoke scenario: argument parsing,
//! log setup, step progress and the final report.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, FormatArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{
    render_failure_json, render_report_json, render_report_text, OutputFormat, ProgressReporter,
};
pub use runner::{init_tracing, SmokeRunner};
