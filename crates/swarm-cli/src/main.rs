//! Swarm CLI — entry point.
//!
//! # Commands
//!
//! - `swarm ping [--model MODEL] [--blocking]` — send one smoke-test prompt and print usage
//! - `swarm status` — show configuration, endpoints, and credential status

mod helpers;
mod ping;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Swarm — multi-provider LLM completion client with usage metering
#[derive(Parser)]
#[command(name = "swarm", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a smoke-test prompt and report the reply and its cost
    Ping {
        /// Model identifier (selects the backend)
        #[arg(short, long, default_value = ping::DEFAULT_MODEL)]
        model: String,

        /// Prompt to send
        #[arg(short, long, default_value = ping::DEFAULT_PROMPT)]
        prompt: String,

        /// Use the blocking path (single attempt, no retry)
        #[arg(long, default_value_t = false)]
        blocking: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration, endpoints, and credential status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping {
            model,
            prompt,
            blocking,
            logs,
        } => {
            init_logging(logs);
            ping::run(model, prompt, blocking).await
        }
        Commands::Status => {
            init_logging(false);
            status::run()
        }
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if verbose {
        "swarm_core=debug,swarm_usage=debug,swarm_providers=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
