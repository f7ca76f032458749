//! inlay CLI - Inline widget decoder.
//!
//! Provides commands for:
//! - `decode`: Replace widget markers in a document with widget output
//! - `widgets`: Show how each allow-listed widget resolves

mod commands;
mod error;
mod output;
mod widgets;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DecodeArgs, WidgetsArgs};
use output::Output;

/// inlay - Inline widget decoder.
#[derive(Parser)]
#[command(name = "inlay", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode widget markers in a document.
    Decode(DecodeArgs),
    /// List allow-listed widgets and their handlers.
    Widgets(WidgetsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Decode(args) => args.verbose,
        Commands::Widgets(_) => false,
    };

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Decode(args) => args.execute(),
        Commands::Widgets(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
