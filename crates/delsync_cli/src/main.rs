//! delsync CLI
//!
//! Command-line tools for delete-for-me sync payloads.
//!
//! # Commands
//!
//! - `inspect` - Decode a durable payload and summarize it
//! - `encode` - Build a durable payload from JSON
//! - `lower` - Convert a durable payload to protobuf wire bytes
//! - `raise` - Convert protobuf wire bytes to a durable payload

mod commands;
mod view;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Delete-for-me sync payload tools.
#[derive(Parser)]
#[command(name = "delsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a durable payload and summarize it
    Inspect {
        /// Durable payload, hex-encoded
        payload: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Build a durable payload from its JSON view
    Encode {
        /// JSON intent set
        json: String,
    },

    /// Convert a durable payload to protobuf `SyncMessage` bytes
    Lower {
        /// Durable payload, hex-encoded
        payload: String,
    },

    /// Convert protobuf `SyncMessage` bytes to a durable payload
    Raise {
        /// Wire message, hex-encoded
        message: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs on stderr, command output on stdout.
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
        Commands::Inspect { payload, format } => commands::inspect::run(&payload, &format)?,
        Commands::Encode { json } => commands::encode::run(&json)?,
        Commands::Lower { payload } => commands::lower::run(&payload)?,
        Commands::Raise { message } => commands::raise::run(&message)?,
        Commands::Version => {
            println!("delsync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Durable format v{}", delsync_protocol::CONTENTS_VERSION);
        }
    }

    Ok(())
}
