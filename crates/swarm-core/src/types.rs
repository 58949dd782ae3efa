//! Core types for Swarm — the chat completions wire format and normalized results.
//!
//! Every supported backend (hosted OpenAI, LM Studio, Ollama) speaks the same
//! OpenAI-compatible `/chat/completions` dialect, so one set of types covers all of them.

use serde::{Deserialize, Serialize};

/// First-message content that marks a disabled turn. Requests carrying it never
/// reach the network.
pub const SKIP_MARKER: &str = "$skip$";

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// Author of a chat message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message. Order within a conversation is chronological.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message with text content.
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message with multipart content (text + images).
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    /// Create an assistant message with text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Plain text of the message, `None` for multipart content.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(_) => None,
        }
    }

    /// Whether this message is the disabled-turn marker.
    pub fn is_skip_marker(&self) -> bool {
        self.text() == Some(SKIP_MARKER)
    }
}

// ─────────────────────────────────────────────
// Message Content (text or multipart/vision)
// ─────────────────────────────────────────────

/// Message content — either plain text or multipart (for vision prompts).
///
/// When serialized: text becomes a plain string, parts become an array of objects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single part of a multipart message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    /// Image URL part (a URL or a base64 data URI).
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }
}

/// Image URL payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ─────────────────────────────────────────────
// Chat completion request (wire body)
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
///
/// `top_p`, `frequency_penalty` and `presence_penalty` are pinned; use
/// [`ChatCompletionRequest::new`] to get the fixed values.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub n: u32,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(
        model: &'a str,
        messages: &'a [Message],
        max_tokens: u32,
        temperature: f64,
        n: u32,
    ) -> Self {
        ChatCompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            n,
        }
    }
}

// ─────────────────────────────────────────────
// Chat completion response (wire body)
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Usage block exactly as sent. Kept untyped so a malformed block never
    /// fails decoding of the choices.
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

/// A single choice in a chat completion response.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Clone, Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Choice texts in provider order; a choice without content yields `""`.
    pub fn texts(&self) -> Vec<String> {
        self.choices
            .iter()
            .map(|c| c.message.content.clone().unwrap_or_default())
            .collect()
    }
}

/// Token usage statistics reported by the provider.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

// ─────────────────────────────────────────────
// Normalized completion
// ─────────────────────────────────────────────

/// A normalized completion result.
///
/// `Single` when one completion was requested, `Multiple` (in provider order) otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Single(String),
    Multiple(Vec<String>),
}

impl Completion {
    /// The empty result returned for skipped turns.
    pub fn empty() -> Self {
        Completion::Single(String::new())
    }

    /// The single text, or the first text of a multi-completion.
    pub fn first(&self) -> Option<&str> {
        match self {
            Completion::Single(text) => Some(text),
            Completion::Multiple(texts) => texts.first().map(String::as_str),
        }
    }

    /// All texts as a vector, regardless of shape.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Completion::Single(text) => vec![text],
            Completion::Multiple(texts) => texts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Completion::Single(_) => 1,
            Completion::Multiple(texts) => texts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Completion::Single(text) => text.is_empty(),
            Completion::Multiple(texts) => texts.is_empty(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
