//! # Text Completion
//!
//! A single operation, `complete(prompt) -> String`, that never fails. Backend
//! errors are logged and replaced by [`DEGRADED_RESPONSE`] so the pipeline can
//! keep going with fallback content.

pub mod anthropic;
mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::LlmError;

/// Returned in place of model output whenever a backend call fails.
pub const DEGRADED_RESPONSE: &str = "[LLM ERROR]";

/// Role of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Input to a completion: plain text or role-tagged messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl Prompt {
    /// The usual shape for stage prompts: instructions plus one user turn.
    pub fn system_and_user(system: impl Into<String>, user: impl Into<String>) -> Self {
        Prompt::Messages(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    /// Joined system messages, for backends that take instructions separately.
    pub fn system_text(&self) -> Option<String> {
        match self {
            Prompt::Text(_) => None,
            Prompt::Messages(messages) => {
                let parts: Vec<&str> = messages
                    .iter()
                    .filter(|m| m.role == Role::System)
                    .map(|m| m.content.as_str())
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n\n"))
                }
            }
        }
    }

    /// Non-system content as a list of user turns.
    pub fn user_turns(&self) -> Vec<&str> {
        match self {
            Prompt::Text(text) => vec![text.as_str()],
            Prompt::Messages(messages) => messages
                .iter()
                .filter(|m| m.role == Role::User)
                .map(|m| m.content.as_str())
                .collect(),
        }
    }

    /// The prompt as role-tagged messages; plain text becomes one user turn.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match self {
            Prompt::Text(text) => vec![ChatMessage::user(text.clone())],
            Prompt::Messages(messages) => messages.clone(),
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<Vec<ChatMessage>> for Prompt {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Prompt::Messages(messages)
    }
}

/// A concrete model API. Implementations report failures; the client
/// decides what a failure means for callers.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

/// Shared, read-only completion handle.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn CompletionBackend>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Run one completion. Never fails: any backend error yields
    /// [`DEGRADED_RESPONSE`].
    pub async fn complete(&self, prompt: impl Into<Prompt>) -> String {
        let prompt = prompt.into();
        match self.backend.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(backend = self.backend.name(), "Completion returned empty text");
                DEGRADED_RESPONSE.to_string()
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "Completion failed");
                DEGRADED_RESPONSE.to_string()
            }
        }
    }

    pub fn is_degraded(text: &str) -> bool {
        text.trim() == DEGRADED_RESPONSE
    }
}

/// POST a JSON body and return the parsed JSON response, mapping HTTP
/// failures onto [`LlmError`].
pub(crate) async fn send_json(
    request: reqwest::RequestBuilder,
    payload: &serde_json::Value,
) -> Result<serde_json::Value, LlmError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))
}
