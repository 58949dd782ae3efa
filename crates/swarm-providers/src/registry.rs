//! Provider registry — the closed set of supported backends and endpoint resolution.
//!
//! Each `ProviderKind` knows its default API base and whether it needs a
//! credential. [`EndpointResolver`] maps a model identifier to a concrete
//! endpoint, picking a key from the credential pool for hosted models.

use swarm_core::config::schema::{
    EndpointsConfig, LM_STUDIO_API_BASE, OLLAMA_API_BASE, OPENAI_API_BASE,
};
use tracing::debug;

use crate::credentials::CredentialPool;
use crate::error::{LlmError, Result};

/// Model alias that routes to the local LM Studio server.
pub const LM_STUDIO_ALIAS: &str = "lmstudio";
/// Model alias that routes to the local Ollama server.
pub const OLLAMA_ALIAS: &str = "ollama";
/// Model ids with this prefix go to the hosted OpenAI API.
pub const HOSTED_MODEL_PREFIX: &str = "gpt";

// ─────────────────────────────────────────────
// ProviderKind
// ─────────────────────────────────────────────

/// A supported completion backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Hosted OpenAI API. Requires a credential.
    OpenAi,
    /// Local LM Studio server.
    LmStudio,
    /// Local Ollama server; also the fallback for unrecognized models.
    Ollama,
}

impl ProviderKind {
    /// All kinds, in matching priority order.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::LmStudio,
        ProviderKind::Ollama,
        ProviderKind::OpenAi,
    ];

    /// Select the backend for a model identifier.
    ///
    /// Local aliases match exactly; `gpt*` goes to the hosted API; anything
    /// else defaults to the local Ollama runtime.
    pub fn for_model(model: &str) -> Self {
        if model == LM_STUDIO_ALIAS {
            ProviderKind::LmStudio
        } else if model == OLLAMA_ALIAS {
            ProviderKind::Ollama
        } else if model.starts_with(HOSTED_MODEL_PREFIX) {
            ProviderKind::OpenAi
        } else {
            ProviderKind::Ollama
        }
    }

    /// Internal name (e.g. `"openai"`).
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::LmStudio => "lmstudio",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Human-readable name for logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::LmStudio => "LM Studio",
            ProviderKind::Ollama => "Ollama",
        }
    }

    pub fn requires_credential(&self) -> bool {
        matches!(self, ProviderKind::OpenAi)
    }

    pub fn is_local(&self) -> bool {
        !self.requires_credential()
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => OPENAI_API_BASE,
            ProviderKind::LmStudio => LM_STUDIO_API_BASE,
            ProviderKind::Ollama => OLLAMA_API_BASE,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ─────────────────────────────────────────────
// Endpoint resolution
// ─────────────────────────────────────────────

/// A concrete endpoint for one call.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub kind: ProviderKind,
    pub base_url: String,
    /// Bearer token, `None` for local backends.
    pub credential: Option<String>,
}

impl std::fmt::Debug for ResolvedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEndpoint")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("has_credential", &self.credential.is_some())
            .finish()
    }
}

impl ResolvedEndpoint {
    /// Build the full chat completions URL.
    pub fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

/// Resolves model identifiers to endpoints and credentials.
#[derive(Clone, Debug)]
pub struct EndpointResolver {
    endpoints: EndpointsConfig,
    credentials: CredentialPool,
}

impl EndpointResolver {
    pub fn new(endpoints: EndpointsConfig, credentials: CredentialPool) -> Self {
        Self {
            endpoints,
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialPool {
        &self.credentials
    }

    /// Configured base URL for `kind`.
    pub fn base_url(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::OpenAi => &self.endpoints.openai,
            ProviderKind::LmStudio => &self.endpoints.lm_studio,
            ProviderKind::Ollama => &self.endpoints.ollama,
        }
    }

    /// Resolve the endpoint for `model`.
    ///
    /// Fails with [`LlmError::Configuration`] when a hosted model is requested
    /// and the credential pool is empty.
    pub fn resolve(&self, model: &str) -> Result<ResolvedEndpoint> {
        let kind = ProviderKind::for_model(model);

        let credential = if kind.requires_credential() {
            let key = self.credentials.pick().ok_or_else(|| {
                LlmError::Configuration(format!(
                    "No API key available for model '{}'. \
                     Set OPENAI_API_KEY (or OPENAI_API_KEY0..9).",
                    model
                ))
            })?;
            Some(key.to_string())
        } else {
            None
        };

        debug!(provider = kind.name(), model, "resolved endpoint");

        Ok(ResolvedEndpoint {
            kind,
            base_url: self.base_url(kind).to_string(),
            credential,
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(keys: &[&str]) -> EndpointResolver {
        EndpointResolver::new(EndpointsConfig::default(), CredentialPool::new(keys.iter().copied()))
    }

    #[test]
    fn test_for_model_local_aliases() {
        assert_eq!(ProviderKind::for_model("lmstudio"), ProviderKind::LmStudio);
        assert_eq!(ProviderKind::for_model("ollama"), ProviderKind::Ollama);
    }

    #[test]
    fn test_for_model_hosted() {
        assert_eq!(ProviderKind::for_model("gpt-4o-mini"), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::for_model("gpt-3.5-turbo"), ProviderKind::OpenAi);
    }

    #[test]
    fn test_for_model_defaults_to_local_runtime() {
        assert_eq!(ProviderKind::for_model("llama3"), ProviderKind::Ollama);
        assert_eq!(ProviderKind::for_model("lmstudio-community/x"), ProviderKind::Ollama);
        assert_eq!(ProviderKind::for_model("dall-e-3"), ProviderKind::Ollama);
    }

    #[test]
    fn test_resolve_hosted_uses_pool() {
        let endpoint = resolver(&["sk-one", "sk-two"]).resolve("gpt-4").unwrap();
        assert_eq!(endpoint.kind, ProviderKind::OpenAi);
        assert_eq!(endpoint.base_url, "https://api.openai.com/v1");
        let key = endpoint.credential.unwrap();
        assert!(key == "sk-one" || key == "sk-two");
    }

    #[test]
    fn test_resolve_hosted_without_keys_is_configuration_error() {
        let err = resolver(&[]).resolve("gpt-4o-mini").unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
        assert!(err.to_string().contains("gpt-4o-mini"));
    }

    #[test]
    fn test_resolve_local_needs_no_key() {
        let r = resolver(&[]);
        let studio = r.resolve("lmstudio").unwrap();
        assert_eq!(studio.base_url, "http://localhost:1234/v1");
        assert!(studio.credential.is_none());

        let ollama = r.resolve("mistral").unwrap();
        assert_eq!(ollama.base_url, "http://localhost:11434/v1");
        assert!(ollama.credential.is_none());
    }

    #[test]
    fn test_resolve_uses_configured_base() {
        let endpoints = EndpointsConfig {
            ollama: "http://gpu-box:11434/v1/".to_string(),
            ..Default::default()
        };
        let r = EndpointResolver::new(endpoints, CredentialPool::default());
        let endpoint = r.resolve("llama3").unwrap();
        assert_eq!(endpoint.completions_url(), "http://gpu-box:11434/v1/chat/completions");
    }

    #[test]
    fn test_completions_url_no_trailing_slash() {
        let endpoint = resolver(&["k"]).resolve("gpt-4").unwrap();
        assert_eq!(endpoint.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_kind_metadata() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.requires_credential(), !kind.is_local());
            assert!(kind.default_api_base().starts_with("http"));
        }
        assert_eq!(ProviderKind::OpenAi.to_string(), "OpenAI");
    }

    #[test]
    fn test_debug_hides_credential() {
        let endpoint = resolver(&["sk-secret-value"]).resolve("gpt-4").unwrap();
        assert!(!format!("{endpoint:?}").contains("sk-secret-value"));
    }
}
