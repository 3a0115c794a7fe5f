// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Ringloop CLI
//!
//! Command-line interface for ringloop rings and pipeline loops.

use clap::{Parser, Subcommand};

mod commands;
mod cpu_affinity;

/// Ringloop - lock-free rings and burst pipeline loops
#[derive(Parser)]
#[command(name = "ringloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ringloop.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },

    /// Create the configured rings and show their diagnostics
    Rings {
        /// Print raw diagnostic replies as JSON
        #[arg(long)]
        json: bool,
    },

    /// Feed synthetic sources through the first ring under a pipeline loop
    Run {
        /// Number of producer threads
        #[arg(short, long, default_value_t = 1)]
        producers: usize,

        /// Stop after this many milliseconds (default: wait for Ctrl-C)
        #[arg(short, long)]
        duration_ms: Option<u64>,
    },

    /// Multi-producer stress check with loss and duplicate detection
    Stress {
        /// Number of producer threads
        #[arg(short, long, default_value_t = 4)]
        producers: usize,

        /// Tagged handles enqueued by each producer
        #[arg(long, default_value_t = 100_000)]
        per_producer: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Validate { file } => commands::validate::execute(&file).await,
        Commands::Rings { json } => commands::rings::execute(&cli.config, json).await,
        Commands::Run {
            producers,
            duration_ms,
        } => commands::run::execute(&cli.config, producers, duration_ms).await,
        Commands::Stress {
            producers,
            per_producer,
        } => commands::stress::execute(producers, per_producer).await,
    }
}
