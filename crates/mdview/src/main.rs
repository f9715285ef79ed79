//! mdview CLI - Markdown render-tree builder.
//!
//! Provides commands for:
//! - `render`: Build a markdown file and print its render-tree outline
//! - `styles`: Print the resolved text style of every element tag

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, StylesArgs};
use output::Output;

/// mdview - Markdown render-tree builder.
#[derive(Parser)]
#[command(name = "mdview", version, about)]
struct Cli {
    /// Enable verbose output (show build timing logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a markdown file and print the render tree.
    Render(RenderArgs),
    /// Print resolved styles and layout constants.
    Styles(StylesArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(cli.verbose),
        Commands::Styles(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
