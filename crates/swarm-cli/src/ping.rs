//! `swarm ping` — end-to-end smoke test against a real backend.
//!
//! Loads `.env` and the config file, sends one prompt through the chat
//! client, and prints the reply together with the metered usage.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use swarm_core::config::{load_config, load_dotenv};
use swarm_providers::{ChatClient, CredentialPool, Dispatcher, GenOptions};
use swarm_usage::{CallerChain, UsageLedger};

use crate::helpers;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PROMPT: &str = "Say 'Hello, API is working!'";

/// Run the ping command.
pub async fn run(model: String, prompt: String, blocking: bool) -> Result<()> {
    load_dotenv();
    let config = load_config(None);

    let ledger = Arc::new(UsageLedger::new());
    let dispatcher = Dispatcher::from_config(&config, CredentialPool::from_env(), Arc::clone(&ledger));
    let client = ChatClient::new(model, Arc::new(dispatcher), config.defaults.clone());

    info!(
        model = client.model(),
        provider = client.provider_kind().display_name(),
        blocking,
        "sending smoke-test prompt"
    );

    let options = GenOptions::default().caller(CallerChain::new("swarm.ping"));
    let model = client.model().to_string();
    // The blocking client is created and dropped on the blocking pool, never
    // on a runtime worker.
    let completion = if blocking {
        tokio::task::spawn_blocking(move || client.gen(prompt, options))
            .await
            .context("blocking completion task panicked")?
    } else {
        client.agen(prompt, options).await
    };

    let completion = match completion {
        Ok(completion) => completion,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            helpers::print_usage(&ledger.records(), &ledger.totals());
            return Err(e).with_context(|| format!("ping to {} failed", model));
        }
    };

    helpers::print_response(&completion.into_texts());
    helpers::print_usage(&ledger.records(), &ledger.totals());

    Ok(())
}
