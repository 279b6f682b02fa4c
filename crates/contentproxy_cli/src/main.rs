//! Content Proxy CLI
//!
//! Command-line tools for content object proxy maintenance.
//!
//! # Commands
//!
//! - `types` - List the entity types content nodes may mirror
//! - `sync` - Synchronize all entities of a type onto their nodes

mod commands;

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Content object proxy maintenance tools.
#[derive(Parser)]
#[command(name = "contentproxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the dataset file (JSON, or CBOR with a .cbor extension)
    #[arg(global = true, short, long)]
    dataset: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a list of mirrorable entity types
    Types {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Synchronize entities of one type onto the content repository
    Sync {
        /// Entity type to synchronize
        #[arg(value_name = "TYPE")]
        entity_type: String,

        /// Workspace to synchronize
        #[arg(short, long, default_value = "live")]
        workspace: String,

        /// Write the updated dataset to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Types { format } => {
            let dataset = cli.dataset.ok_or("Dataset path required for types")?;
            commands::types::run(&dataset, &format, &mut out)?;
        }
        Commands::Sync {
            entity_type,
            workspace,
            output,
            format,
        } => {
            let dataset = cli.dataset.ok_or("Dataset path required for sync")?;
            commands::sync::run(
                &dataset,
                &entity_type,
                &workspace,
                output.as_deref(),
                &format,
                &mut out,
            )?;
        }
        Commands::Version => {
            writeln!(out, "Content Proxy CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Content Proxy Core v{}", contentproxy_core::VERSION)?;
        }
    }

    Ok(())
}
