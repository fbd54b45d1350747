//! memstash CLI
//!
//! Command-line tools for memstash snapshot files.
//!
//! # Commands
//!
//! - `inspect` - Display snapshot statistics per namespace
//! - `verify` - Check every record of a snapshot
//! - `dump` - Print the documents held in a snapshot

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// memstash command-line snapshot tools.
#[derive(Parser)]
#[command(name = "memstash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the snapshot file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display snapshot statistics per namespace
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify that every record is a tagged document
    Verify,

    /// Print the documents held in a snapshot
    Dump {
        /// Only dump this namespace
        #[arg(short, long)]
        namespace: Option<String>,

        /// Maximum number of documents to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Snapshot path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Snapshot path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Dump {
            namespace,
            limit,
            format,
        } => {
            let path = cli.path.ok_or("Snapshot path required for dump")?;
            commands::dump::run(&path, namespace.as_deref(), limit, &format)?;
        }
        Commands::Version => {
            println!("memstash CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("memstash core v{}", memstash_core::VERSION);
        }
    }

    Ok(())
}
