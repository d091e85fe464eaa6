//! OpenAI-compatible chat completions
//!
//! Serves OpenAI itself plus the gateways that speak the same wire format
//! (OpenRouter, xAI Grok, DeepSeek).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{send_json, CompletionBackend, LlmError, Prompt};

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
const GROK_BASE: &str = "https://api.x.ai/v1";
const DEEPSEEK_BASE: &str = "https://api.deepseek.com/v1";

pub struct OpenAiCompatibleBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    label: &'static str,
}

impl OpenAiCompatibleBackend {
    fn new(
        client: Client,
        api_key: String,
        base_url: &str,
        model: &str,
        temperature: f32,
        label: &'static str,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.to_string(),
            model: model.to_string(),
            temperature,
            label,
        }
    }

    pub fn openai(client: Client, api_key: String, model: &str, temperature: f32) -> Self {
        Self::new(client, api_key, OPENAI_BASE, model, temperature, "openai")
    }

    pub fn openrouter(client: Client, api_key: String, model: &str, temperature: f32) -> Self {
        Self::new(client, api_key, OPENROUTER_BASE, model, temperature, "openrouter")
    }

    pub fn grok(client: Client, api_key: String, model: &str, temperature: f32) -> Self {
        Self::new(client, api_key, GROK_BASE, model, temperature, "grok")
    }

    pub fn deepseek(client: Client, api_key: String, model: &str, temperature: f32) -> Self {
        Self::new(client, api_key, DEEPSEEK_BASE, model, temperature, "deepseek")
    }

    /// Point at a proxy or self-hosted server (e.g. a local vLLM)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn payload(&self, prompt: &Prompt) -> Value {
        let messages: Vec<Value> = prompt
            .to_messages()
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages
        })
    }
}

pub(crate) fn parse_response(json: &Value) -> Result<String, LlmError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::Parse("missing choices[0].message.content".to_string()))?
        .trim();

    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let payload = self.payload(prompt);
        tracing::debug!(backend = self.label, model = %self.model, "Sending chat completion");

        let request = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key));

        let json = send_json(request, &payload).await?;
        parse_response(&json)
    }
}
