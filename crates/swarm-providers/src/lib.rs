//! Completion layer for Swarm.
//!
//! Talks directly to OpenAI-compatible `/chat/completions` endpoints: the
//! hosted OpenAI API and local LM Studio / Ollama servers.
//!
//! # Architecture
//!
//! - [`registry`] — closed set of backends + model → endpoint resolution
//! - [`credentials::CredentialPool`] — interchangeable API keys from the environment
//! - [`retry::RetryPolicy`] — jittered exponential backoff with per-attempt deadlines
//! - [`dispatcher::Dispatcher`] — sends, meters, and normalizes one completion
//! - [`client::ChatClient`] — model-bound facade with generation defaults
//! - [`vision::VisionClient`] — image and video-frame descriptions
//! - [`media`] — base64 encoding and frame sources

pub mod client;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod media;
pub mod registry;
pub mod retry;
pub mod traits;
pub mod vision;

// Re-export main types for convenience
pub use client::{ChatClient, GenOptions, Prompt};
pub use credentials::CredentialPool;
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, LlmError, Result};
pub use media::{DirectoryFrames, EncodedFrames, FrameSource};
pub use registry::{EndpointResolver, ProviderKind, ResolvedEndpoint};
pub use retry::RetryPolicy;
pub use traits::{CompletionRequest, LlmProvider};
pub use vision::VisionClient;
