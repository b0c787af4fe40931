//! Graphcheck CLI: smoke test for the dependency graph web app
//!
//! ## Usage
//!
//! ```bash
//! graphcheck                                # Check http://localhost:5173
//! graphcheck --url http://127.0.0.1:4173    # Check another server
//! graphcheck --format json -q               # Machine-readable report only
//! ```

use clap::Parser;
use graphcheck_cli::{init_tracing, Cli, CliResult, SmokeRunner};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = cli.cli_config();
    let verify = cli.verify_config()?;
    init_tracing(config.verbosity);

    SmokeRunner::new(config, verify).run()?;
    Ok(())
}
