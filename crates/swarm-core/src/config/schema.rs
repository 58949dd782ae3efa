//! Configuration schema.
//!
//! Hierarchy: `Config` → `EndpointsConfig`, `GenerationDefaults`, `RetryConfig`,
//! `VisionConfig`, `HttpConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! Credentials are deliberately absent: they come from the process environment.

use serde::{Deserialize, Serialize};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const LM_STUDIO_API_BASE: &str = "http://localhost:1234/v1";
pub const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.swarm/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub endpoints: EndpointsConfig,
    pub defaults: GenerationDefaults,
    pub retry: RetryConfig,
    pub vision: VisionConfig,
    pub http: HttpConfig,
}

// ─────────────────────────────────────────────
// Endpoints
// ─────────────────────────────────────────────

/// Base URLs of the three supported backends.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointsConfig {
    /// Hosted OpenAI API.
    pub openai: String,
    /// Local LM Studio server.
    pub lm_studio: String,
    /// Local Ollama server.
    pub ollama: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            openai: OPENAI_API_BASE.to_string(),
            lm_studio: LM_STUDIO_API_BASE.to_string(),
            ollama: OLLAMA_API_BASE.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Generation defaults
// ─────────────────────────────────────────────

/// Defaults applied by the client facade when a call leaves a parameter unset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationDefaults {
    /// Maximum tokens to generate per completion.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Number of completions requested per call.
    pub num_completions: u32,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.2,
            num_completions: 1,
        }
    }
}

// ─────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────

/// Retry settings for the asynchronous path.
///
/// The wait before attempt `k + 1` is drawn uniformly from
/// `[0, min(max_wait, multiplier · 2^(k-1))]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff base in milliseconds.
    pub multiplier_ms: u64,
    /// Upper bound of a single backoff wait, in seconds.
    pub max_wait_secs: u64,
    /// Hard deadline for one attempt, in seconds.
    pub attempt_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            multiplier_ms: 1000,
            max_wait_secs: 100,
            attempt_timeout_secs: 1000,
        }
    }
}

// ─────────────────────────────────────────────
// Vision
// ─────────────────────────────────────────────

/// Vision client settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionConfig {
    /// Maximum tokens per image description.
    pub max_tokens: u32,
    /// Keep every n-th frame when reading a frame directory.
    pub frame_stride: usize,
    /// Describe every n-th kept frame of a video.
    pub frame_interval: usize,
    /// Upper bound on frames described per video.
    pub max_frames: usize,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            max_tokens: 300,
            frame_stride: 10,
            frame_interval: 30,
            max_frames: 30,
        }
    }
}

// ─────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────

/// HTTP client settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Request timeout for the blocking client, in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 600 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_endpoints() {
        let config = Config::default();
        assert_eq!(config.endpoints.openai, "https://api.openai.com/v1");
        assert_eq!(config.endpoints.lm_studio, "http://localhost:1234/v1");
        assert_eq!(config.endpoints.ollama, "http://localhost:11434/v1");
        assert_eq!(config.retry.max_attempts, 10);
        assert_eq!(config.retry.max_wait_secs, 100);
        assert_eq!(config.retry.attempt_timeout_secs, 1000);
        assert_eq!(config.vision.max_tokens, 300);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"defaults": {"maxTokens": 64}}"#).unwrap();
        assert_eq!(config.defaults.max_tokens, 64);
        assert_eq!(config.defaults.num_completions, 1);
        assert_eq!(config.endpoints, EndpointsConfig::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let raw = serde_json::to_value(Config::default()).unwrap();
        assert!(raw["endpoints"].get("lmStudio").is_some());
        assert!(raw["retry"].get("attemptTimeoutSecs").is_some());
        assert!(raw["retry"].get("attempt_timeout_secs").is_none());
    }
}
