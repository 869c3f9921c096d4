use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flowstudio_cli::{CliError, Engine, EngineConfig, Outcome};
use flowstudio_core::Result;
use flowstudio_workflow::{Direction, Mode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Flowstudio - structural checks for workflow DSL documents
#[derive(Parser)]
#[command(name = "flowstudio")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Node-type catalog file; overrides the configured catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a workflow; exits with 1 when it has errors
    Validate {
        /// Path to the workflow document
        document: PathBuf,

        /// Mode to validate against instead of the declared one
        #[arg(long)]
        mode: Option<Mode>,
    },

    /// List the nodes that can run before a node
    Upstream {
        /// Path to the workflow document
        document: PathBuf,

        /// The node ID to resolve
        #[arg(long)]
        node: String,

        /// Only list nodes with output fields, including the fields
        #[arg(long)]
        with_outputs: bool,
    },

    /// Compare two versions of a workflow
    Diff {
        /// Path to the base version
        base: PathBuf,

        /// Path to the target version
        target: PathBuf,
    },

    /// Compute node positions
    Layout {
        /// Path to the workflow document
        document: PathBuf,

        /// Flow direction: top-down or left-right
        #[arg(long, default_value = "top-down")]
        direction: Direction,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(outcome) => {
            println!("{}", outcome.json);
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(report) => {
            eprintln!("error: {report}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome, CliError> {
    let config = EngineConfig::load(cli.config.as_deref()).map_err(|e| CliError::Config {
        details: e.to_string(),
    })?;
    tracing::debug!(?config, "loaded configuration");
    let engine = Engine::new(config, cli.catalog.as_deref())?;

    match cli.command {
        Commands::Validate { document, mode } => engine.validate(&document, mode),
        Commands::Upstream {
            document,
            node,
            with_outputs,
        } => engine.upstream(&document, &node, with_outputs),
        Commands::Diff { base, target } => engine.diff(&base, &target),
        Commands::Layout {
            document,
            direction,
        } => engine.layout(&document, direction),
    }
}
