//! Core types and configuration for the Swarm LLM client.
//!
//! - [`types`] — chat messages, the OpenAI-compatible wire format, normalized completions
//! - [`config`] — on-disk schema, loader, and environment overrides
//! - [`utils`] — path and string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use types::{Completion, ContentPart, Message, MessageContent, Role, TokenUsage};
