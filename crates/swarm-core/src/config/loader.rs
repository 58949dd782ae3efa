//! Config loader — reads `~/.swarm/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.swarm/config.json`
//! 3. Environment variables `SWARM_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load a `.env` file from the working directory (or a parent) into the
/// process environment, overriding variables that are already set.
///
/// Call once at startup, before credentials are read.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv_override() {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Failed to load .env file: {}", e);
            None
        }
    }
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `SWARM_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `SWARM_ENDPOINTS__OPENAI` / `__LM_STUDIO` / `__OLLAMA`
/// - `SWARM_DEFAULTS__MAX_TOKENS` / `__TEMPERATURE` / `__NUM_COMPLETIONS`
/// - `SWARM_RETRY__MAX_ATTEMPTS` / `__MULTIPLIER_MS` / `__MAX_WAIT_SECS` / `__ATTEMPT_TIMEOUT_SECS`
/// - `SWARM_VISION__MAX_TOKENS` / `__FRAME_STRIDE` / `__FRAME_INTERVAL` / `__MAX_FRAMES`
/// - `SWARM_HTTP__TIMEOUT_SECS`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply overrides, resolving each variable name through `lookup`.
fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    // Endpoints
    if let Some(val) = lookup("SWARM_ENDPOINTS__OPENAI") {
        config.endpoints.openai = val;
    }
    if let Some(val) = lookup("SWARM_ENDPOINTS__LM_STUDIO") {
        config.endpoints.lm_studio = val;
    }
    if let Some(val) = lookup("SWARM_ENDPOINTS__OLLAMA") {
        config.endpoints.ollama = val;
    }

    // Generation defaults
    let defaults = &mut config.defaults;
    override_parsed(&lookup, "SWARM_DEFAULTS__MAX_TOKENS", &mut defaults.max_tokens);
    override_parsed(&lookup, "SWARM_DEFAULTS__TEMPERATURE", &mut defaults.temperature);
    override_parsed(&lookup, "SWARM_DEFAULTS__NUM_COMPLETIONS", &mut defaults.num_completions);

    // Retry
    let retry = &mut config.retry;
    override_parsed(&lookup, "SWARM_RETRY__MAX_ATTEMPTS", &mut retry.max_attempts);
    override_parsed(&lookup, "SWARM_RETRY__MULTIPLIER_MS", &mut retry.multiplier_ms);
    override_parsed(&lookup, "SWARM_RETRY__MAX_WAIT_SECS", &mut retry.max_wait_secs);
    override_parsed(&lookup, "SWARM_RETRY__ATTEMPT_TIMEOUT_SECS", &mut retry.attempt_timeout_secs);

    // Vision
    let vision = &mut config.vision;
    override_parsed(&lookup, "SWARM_VISION__MAX_TOKENS", &mut vision.max_tokens);
    override_parsed(&lookup, "SWARM_VISION__FRAME_STRIDE", &mut vision.frame_stride);
    override_parsed(&lookup, "SWARM_VISION__FRAME_INTERVAL", &mut vision.frame_interval);
    override_parsed(&lookup, "SWARM_VISION__MAX_FRAMES", &mut vision.max_frames);

    // HTTP
    override_parsed(&lookup, "SWARM_HTTP__TIMEOUT_SECS", &mut config.http.timeout_secs);

    config
}

/// Overwrite `target` with the parsed value of `var`; unparsable values are ignored.
fn override_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    target: &mut T,
) {
    if let Some(val) = lookup(var) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!("Ignoring invalid value for {}: {:?}", var, val),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
