//! # Stream Events
//!
//! The wire format of the post generation stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::GeneratedPost;

pub const COMPLETE_MESSAGE: &str = "All posts processed successfully.";
pub const POST_GENERATED_MESSAGE: &str = "Post generated";
pub const PROJECT_GATHERED_MESSAGE: &str = "GitHub project details gathered.";

/// Kind of stream event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Stage narration
    Progress,
    /// One finished post in `payload`
    PostGenerated,
    /// Run finished successfully
    Complete,
    /// Run failed; nothing follows
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl StreamEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            payload: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn progress(message: impl Into<String>) -> Self {
        Self::new(EventKind::Progress, message)
    }

    pub fn post_generated(post: &GeneratedPost) -> Self {
        let event = Self::new(EventKind::PostGenerated, POST_GENERATED_MESSAGE);
        match serde_json::to_value(post) {
            Ok(payload) => event.with_payload(payload),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize post payload");
                event
            }
        }
    }

    pub fn complete() -> Self {
        Self::new(EventKind::Complete, COMPLETE_MESSAGE)
    }

    pub fn error(description: impl std::fmt::Display) -> Self {
        Self::new(
            EventKind::Error,
            format!("Internal Server Error: {}", description),
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Complete | EventKind::Error)
    }
}
