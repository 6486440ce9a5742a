use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use infra_core::config::DEFAULT_PROJECT_NAME;
use infra_core::{
    assemble_with, AssemblyError, AssemblyOptions, ConfigKey, Configuration, MissingTagPolicy,
    StackBlueprint, StackGraph,
};
use thiserror::Error;

use crate::backend::{BackendError, CloudAssemblyBackend, SynthOutput, SynthesisBackend};
use crate::target::DeploymentTarget;

pub const DEFAULT_OUTPUT_DIR: &str = "cdk.out";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "infra",
    about = "Assemble and synthesize the Lambda monorepo stack",
    long_about = "Builds the layer, function and tag graph for one deployment\n\
                  target from environment configuration and writes it out as\n\
                  a cloud assembly."
)]
pub struct Cli {
    #[command(flatten)]
    pub stack: StackArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the template, manifest and construct tree
    Synth {
        /// Cloud assembly output directory
        #[arg(long, short, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },
    /// Print the assembled resource graph as JSON
    Graph,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StackArgs {
    /// Project name, first half of the stack identity
    #[arg(long, global = true, env = "PROJECT_NAME", default_value = DEFAULT_PROJECT_NAME)]
    pub project: String,
    /// Deployment stage (dev, prod, ...)
    #[arg(long, global = true, env = "STAGE")]
    pub stage: Option<String>,
    /// Explicit stack identifier; wins over the stage for naming
    #[arg(long, global = true, env = "IDENTIFIER")]
    pub identifier: Option<String>,
    /// Value of the Owner tag
    #[arg(long, global = true, env = "OWNER")]
    pub owner: Option<String>,
    /// Target AWS account
    #[arg(long, global = true, env = "CDK_DEFAULT_ACCOUNT")]
    pub account: Option<String>,
    /// Target AWS region
    #[arg(long, global = true, env = "CDK_DEFAULT_REGION")]
    pub region: Option<String>,
    /// Fail instead of skipping Owner/Stage tags without a value
    #[arg(long, global = true)]
    pub strict_tags: bool,
}

impl Default for StackArgs {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT_NAME.to_string(),
            stage: None,
            identifier: None,
            owner: None,
            account: None,
            region: None,
            strict_tags: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize graph: {0}")]
    Json(#[from] serde_json::Error),
}

// ── configuration ──────────────────────────────────────────────────

pub fn build_configuration(args: &StackArgs) -> Configuration {
    let mut values = BTreeMap::new();
    values.insert(
        ConfigKey::ProjectName.env_name().to_string(),
        args.project.clone(),
    );
    let optional = [
        (ConfigKey::Stage, &args.stage),
        (ConfigKey::Identifier, &args.identifier),
        (ConfigKey::Owner, &args.owner),
        (ConfigKey::Account, &args.account),
        (ConfigKey::Region, &args.region),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            values.insert(key.env_name().to_string(), value.clone());
        }
    }
    Configuration::from_map(&values)
}

pub fn assembly_options(args: &StackArgs) -> AssemblyOptions {
    AssemblyOptions {
        missing_tags: if args.strict_tags {
            MissingTagPolicy::Reject
        } else {
            MissingTagPolicy::Omit
        },
        ..Default::default()
    }
}

fn assemble_from_args(args: &StackArgs) -> Result<(Configuration, StackGraph), CliError> {
    let config = build_configuration(args);
    let graph = assemble_with(&config, &StackBlueprint::monorepo(), &assembly_options(args))?;
    tracing::info!(
        stack = %graph.identity,
        layers = graph.layers.len(),
        functions = graph.functions.len(),
        tags = graph.tags.len(),
        "stack assembled"
    );
    Ok((config, graph))
}

// ── commands ───────────────────────────────────────────────────────

/// Assembles the stack and hands it to `backend`. The backend is never
/// called when assembly fails.
pub fn cmd_synth(
    args: &StackArgs,
    backend: &dyn SynthesisBackend,
) -> Result<SynthOutput, CliError> {
    let (config, graph) = assemble_from_args(args)?;
    let target = DeploymentTarget::from_config(&config);
    if target.is_env_agnostic() {
        tracing::info!(
            environment = %target.environment_uri(),
            "no explicit account/region; synthesizing an environment-agnostic stack"
        );
    }
    Ok(backend.synthesize(&graph, &target)?)
}

pub fn cmd_graph(args: &StackArgs, out: &mut impl Write) -> Result<(), CliError> {
    let (_, graph) = assemble_from_args(args)?;
    serde_json::to_writer_pretty(&mut *out, &graph)?;
    writeln!(out)?;
    Ok(())
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Synth { output } => {
            let backend = CloudAssemblyBackend::new(output);
            let synthesized = cmd_synth(&cli.stack, &backend)?;
            tracing::info!(
                dir = %backend.output_dir().display(),
                fingerprint = %synthesized.fingerprint,
                "cloud assembly ready"
            );
            println!("{}", synthesized.template_path.display());
        }
        Commands::Graph => {
            let stdout = std::io::stdout();
            cmd_graph(&cli.stack, &mut stdout.lock())?;
        }
    }
    Ok(())
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Maps a command outcome to the process exit code, writing
/// `error: <message>` to `stderr` on failure.
pub fn report(result: Result<(), CliError>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            tracing::debug!(?error, "command aborted");
            // Nothing else can be reported if stderr itself is gone.
            let _ = writeln!(stderr, "error: {error}");
            EXIT_FAILURE
        }
    }
}
