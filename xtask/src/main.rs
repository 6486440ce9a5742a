use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the Lambda monorepo infrastructure workspace",
    long_about = "A unified CLI for synthesizing the stack and running\n\
                  CI checks in the infrastructure workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the stack into a cloud assembly directory
    Synth {
        /// Deployment stage passed through as STAGE
        #[arg(long, env = "STAGE", default_value = "dev")]
        stage: String,
        /// Cloud assembly output directory
        #[arg(long, default_value = "cdk.out")]
        output: String,
    },
    /// Print the assembled resource graph
    Graph {
        /// Deployment stage passed through as STAGE
        #[arg(long, env = "STAGE", default_value = "dev")]
        stage: String,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Check,
    /// Unit, integration and property tests
    Test,
    /// Run check + test + a synth smoke run
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_infra(args: &[&str]) {
    let mut cargo_args = vec!["run", "-q", "-p", "infra_cli", "--bin", "infra", "--"];
    cargo_args.extend_from_slice(args);
    run_cargo(&cargo_args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test infra_core");
    run_cargo(&["test", "-p", "infra_core"]);

    step("Test infra_cli");
    run_cargo(&["test", "-p", "infra_cli"]);
}

fn ci_synth_smoke() {
    step("Synthesize dev stack");
    let output = std::env::temp_dir().join("infra-ci-cdk.out");
    let output = output.to_string_lossy();
    run_infra(&["synth", "--stage", "dev", "--output", &output]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { stage, output } => {
            run_infra(&["synth", "--stage", &stage, "--output", &output]);
        }
        Commands::Graph { stage } => {
            run_infra(&["graph", "--stage", &stage]);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_check();
                    ci_test();
                    ci_synth_smoke();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
