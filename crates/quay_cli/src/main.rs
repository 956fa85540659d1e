//! Quay CLI: the command-line interface for the Quay build cache.
//!
//! Provides `quay cache print-hashes`, which prints the content hash that
//! keys each target's cached binary.

#![warn(missing_docs)]

mod hashes;
mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Quay: content-addressed binary caching for project graphs.
#[derive(Parser, Debug)]
#[command(name = "quay", version, about = "Quay build cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Explicit log level; overrides `--quiet` and `--verbose`.
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogLevel>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Binary cache operations.
    Cache(CacheArgs),
}

/// Arguments for `quay cache`.
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// The cache subcommand to run.
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Print the cache key of every target in the project.
    PrintHashes(PrintHashesArgs),
}

/// Arguments for `quay cache print-hashes`.
#[derive(Args, Debug)]
pub struct PrintHashesArgs {
    /// Project directory. Defaults to the current directory.
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Hash for xcframework output instead of framework output.
    #[arg(short, long)]
    pub xcframeworks: bool,

    /// Cache profile to hash with, as declared in `quay.toml`.
    #[arg(long)]
    pub profile: Option<String>,

    /// Only hash these targets and their dependencies.
    #[arg(long, num_args = 1..)]
    pub targets: Vec<String>,

    /// Number of hashing threads.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One `<name> - <hash>` line per target.
    Text,
    /// A JSON array of entries.
    Json,
}

/// Log verbosity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Progress information.
    Info,
    /// Scheduling and per-target detail.
    Debug,
    /// Everything.
    Trace,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.quiet, cli.verbose, cli.log) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let code = match cli.command {
        Command::Cache(CacheArgs {
            command: CacheCommand::PrintHashes(args),
        }) => {
            pipeline::run_interruptible(move |cancellation| hashes::run(&args, cancellation)).await
        }
    };
    process::exit(code);
}
