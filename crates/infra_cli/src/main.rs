use std::process::ExitCode;

use clap::Parser;
use infra_cli::cli::{report, run, Cli};
use infra_cli::logging::init_tracing;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    ExitCode::from(report(run(cli), &mut std::io::stderr()))
}
