//! Anthropic Messages API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{send_json, CompletionBackend, LlmError, Prompt};

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl AnthropicBackend {
    pub fn new(client: Client, api_key: String, model: &str, temperature: f32) -> Self {
        Self {
            client,
            api_key,
            model: model.to_string(),
            temperature,
        }
    }

    fn payload(&self, prompt: &Prompt) -> Value {
        let messages: Vec<Value> = prompt
            .user_turns()
            .into_iter()
            .map(|content| json!({ "role": "user", "content": content }))
            .collect();

        let mut payload = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": self.temperature,
            "messages": messages
        });
        if let Some(system) = prompt.system_text() {
            payload["system"] = json!(system);
        }
        payload
    }
}

/// Concatenate the text blocks of a Messages API response.
pub(crate) fn parse_response(json: &Value) -> Result<String, LlmError> {
    let blocks = json["content"]
        .as_array()
        .ok_or_else(|| LlmError::Parse("missing content array".to_string()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let payload = self.payload(prompt);
        tracing::debug!(model = %self.model, "Sending Anthropic message");

        let request = self
            .client
            .post(ENDPOINT)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);

        let json = send_json(request, &payload).await?;
        parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_goes_top_level() {
        let backend = AnthropicBackend::new(Client::new(), "key".into(), "claude", 0.7);
        let payload = backend.payload(&Prompt::system_and_user("be terse", "write"));
        assert_eq!(payload["system"], "be terse");
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
        assert_eq!(payload["messages"][0]["content"], "write");
    }

    #[test]
    fn test_parse_joins_text_blocks() {
        let json = json!({
            "content": [
                { "type": "text", "text": "Hello " },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "world" }
            ]
        });
        assert_eq!(parse_response(&json).unwrap(), "Hello world");
    }

    #[test]
    fn test_parse_rejects_missing_content() {
        assert!(parse_response(&json!({})).is_err());
        assert!(matches!(
            parse_response(&json!({ "content": [] })),
            Err(LlmError::EmptyResponse)
        ));
    }
}
