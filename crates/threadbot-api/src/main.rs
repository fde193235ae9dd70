//! threadbot CLI entry point.
//!
//! Binary name: `threadbot`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use threadbot_observe::tracing_setup::{
    filter_for_verbosity, init_tracing, shutdown_tracing, TracingOptions,
};

use cli::chat::loop_runner::{run_chat_loop, ChatOptions};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let tracing_options = TracingOptions {
        default_filter: filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    };
    init_tracing(&tracing_options)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "threadbot", &mut std::io::stdout());
        }

        Commands::Config => {
            cli::config::show_config(cli.json).await?;
        }

        Commands::Chat {
            message,
            model,
            temperature,
            max_tokens,
            debounce,
        } => {
            let state = AppState::init().await?;
            let options = ChatOptions {
                message,
                model,
                temperature,
                max_tokens,
                debounce_secs: debounce,
            };
            tokio::select! {
                result = run_chat_loop(&state, options) => result?,
                () = shutdown_signal() => {
                    tracing::info!("Shutdown signal received");
                }
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
