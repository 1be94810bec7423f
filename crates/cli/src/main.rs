mod params;
mod simulate;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Randomized simulation of the dmarket Order/Bid/Lease workflow.
#[derive(Parser)]
#[command(
    name = "dmarket",
    version,
    about = "Randomized simulation of the dmarket Order/Bid/Lease workflow"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log every simulation step (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a seeded simulation against the in-memory node
    Simulate {
        /// Path to a TOML simulation config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for every random choice (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of blocks to run (overrides the config)
        #[arg(long)]
        blocks: Option<u64>,
        /// Operation steps per block (overrides the config)
        #[arg(long)]
        ops_per_block: Option<usize>,
    },

    /// Print the default operation weights
    Params,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Simulate {
            config,
            seed,
            blocks,
            ops_per_block,
        } => {
            let overrides = simulate::Overrides {
                seed,
                blocks,
                ops_per_block,
            };
            simulate::cmd_simulate(config.as_deref(), overrides, cli.output, cli.quiet);
        }
        Commands::Params => {
            params::cmd_params(cli.output);
        }
    }
}

/// Report an error message in the appropriate output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}
