//! drill CLI - build, run and inspect documentation drills.
//!
//! Provides commands for:
//! - `run`: Print the captured output of a drill, rerunning it when stale
//! - `show`: Print the title, description and program of a drill
//! - `excerpt`: Print a line range of a source file

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExcerptArgs, RunArgs, ShowArgs};
use output::Output;

/// drill - run and cache documentation drills.
#[derive(Parser)]
#[command(name = "drill", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the captured output of a drill.
    Run(RunArgs),
    /// Print the documentation parts of a drill.
    Show(ShowArgs),
    /// Print a line range of a source file.
    Excerpt(ExcerptArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Run(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Show(args) => args.execute(),
        Commands::Excerpt(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
