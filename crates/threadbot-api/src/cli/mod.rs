//! CLI command definitions for the `threadbot` binary.

pub mod chat;
pub mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Hold assistant conversations from the terminal.
#[derive(Parser)]
#[command(name = "threadbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true, env = "THREADBOT_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new conversation with the assistant.
    Chat {
        /// First message. Prompted for when omitted.
        message: Option<String>,

        /// Model to use (must be in allowed_models).
        #[arg(long, short)]
        model: Option<String>,

        /// Sampling temperature, 0 to 1.
        #[arg(long, short)]
        temperature: Option<f64>,

        /// Maximum reply tokens, 1 to 4096.
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Seconds to wait for follow-up messages before answering.
        #[arg(long)]
        debounce: Option<u64>,
    },

    /// Show the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
