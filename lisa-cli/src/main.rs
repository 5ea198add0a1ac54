//! lisa: local indicators of spatial association from the command line.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lisa_core::Parallelism;

#[derive(Parser)]
#[command(
    name = "lisa",
    version,
    about = "LISA-RS: local indicators of spatial association",
    long_about = "Local Geary, local join counts and local spatial heteroscedasticity\n\
                  with conditional randomization inference."
)]
struct Cli {
    /// Number of worker threads for randomization ('all' uses every core)
    #[arg(long, default_value = "1", global = true)]
    threads: Parallelism,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Local Geary (one column) or multivariate local Geary (several)
    Geary(commands::geary::GearyArgs),

    /// Local join counts: univariate, bivariate (BJC/CLC) or multivariate
    JoinCount(commands::join_count::JoinCountArgs),

    /// Local spatial heteroscedasticity
    Losh(commands::losh::LoshArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    tracing::info!("LISA-RS v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using {} worker(s)", cli.threads.resolve());

    match cli.command {
        Commands::Geary(args) => commands::geary::run(args, cli.threads),
        Commands::JoinCount(args) => commands::join_count::run(args, cli.threads),
        Commands::Losh(args) => commands::losh::run(args),
    }
}
