//! `swarm status` — show configuration, endpoints, and credential status.

use anyhow::Result;
use colored::Colorize;

use swarm_core::config::{get_config_path, load_config, load_dotenv};
use swarm_providers::credentials::VISION_KEY_VAR;
use swarm_providers::{CredentialPool, EndpointResolver, ProviderKind};

use crate::helpers::check_mark;

/// Run the status command.
pub fn run() -> Result<()> {
    let dotenv = load_dotenv();
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🐝 Swarm Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(defaults)".dimmed().to_string()
        }
    );
    println!(
        "  {:<18} {}",
        ".env:".bold(),
        dotenv
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not found)".dimmed().to_string())
    );
    println!(
        "  {:<18} {} | temp: {} | n: {}",
        "Defaults:".bold(),
        format!("max_tokens: {}", config.defaults.max_tokens).dimmed(),
        config.defaults.temperature,
        config.defaults.num_completions,
    );
    println!(
        "  {:<18} {} attempts, waits ≤ {}s, deadline {}s",
        "Retry:".bold(),
        config.retry.max_attempts,
        config.retry.max_wait_secs,
        config.retry.attempt_timeout_secs,
    );

    // Endpoints
    let pool = CredentialPool::from_env();
    let resolver = EndpointResolver::new(config.endpoints.clone(), pool.clone());

    println!();
    println!("  {}", "Endpoints:".bold());
    for kind in ProviderKind::ALL {
        let auth = if kind.requires_credential() {
            format!("{} {} key(s)", check_mark(!pool.is_empty()), pool.len())
        } else {
            format!("{}", "local, no key".dimmed())
        };
        println!(
            "    {:<12} {:<32} {}",
            kind.display_name(),
            resolver.base_url(kind),
            auth
        );
    }

    // Credentials
    println!();
    println!("  {}", "Credentials:".bold());
    if pool.is_empty() {
        println!("    {}", "no OPENAI_API_KEY* set".dimmed());
    }
    for masked in pool.masked() {
        println!("    {}", masked);
    }

    let vision = CredentialPool::vision_from_env();
    println!(
        "  {:<18} {} {}",
        "Vision key:".bold(),
        check_mark(!vision.is_empty()),
        vision
            .masked()
            .first()
            .cloned()
            .unwrap_or_else(|| format!("{} not set", VISION_KEY_VAR).dimmed().to_string())
    );

    println!();

    Ok(())
}
