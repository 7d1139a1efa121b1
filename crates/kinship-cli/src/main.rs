//! Kinship CLI - Command-line interface for Kinship
//!
//! Reads a family survey CSV export and writes the nested family tree JSON
//! consumed by the renderer, plus a diagnostics report for the people who
//! maintain the survey data.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "kinship")]
#[command(author = "Kinship Contributors")]
#[command(version)]
#[command(about = "Turn family survey CSV exports into family trees", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to .kinship/config.json, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config in the given directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Use the Danish survey column markers
        #[arg(long)]
        danish: bool,
    },

    /// Convert a survey CSV into family tree JSON
    Convert {
        /// Survey CSV export
        input: PathBuf,

        /// Output file for the tree JSON (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the diagnostics report to this file
        #[arg(short, long)]
        diagnostics: Option<PathBuf>,
    },

    /// Report data problems found in a survey CSV
    Check {
        /// Survey CSV export
        input: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show counts of people, roots, links and anomalies
    Stats {
        /// Survey CSV export
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the close family of one person
    Relatives {
        /// Survey CSV export
        input: PathBuf,

        /// Person id or name
        person: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path, danish } => commands::init(&path, danish),
        Commands::Convert {
            input,
            output,
            diagnostics,
        } => commands::convert(
            cli.config.as_deref(),
            &input,
            output.as_deref(),
            diagnostics.as_deref(),
        ),
        Commands::Check { input, json } => commands::check(cli.config.as_deref(), &input, json),
        Commands::Stats { input, json } => commands::stats(cli.config.as_deref(), &input, json),
        Commands::Relatives { input, person } => {
            commands::relatives(cli.config.as_deref(), &input, &person)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
