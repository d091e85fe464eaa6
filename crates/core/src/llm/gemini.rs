//! Google Gemini `generateContent` REST API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{send_json, CompletionBackend, LlmError, Prompt};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiBackend {
    pub fn new(client: Client, api_key: String, model: &str, temperature: f32) -> Self {
        Self {
            client,
            api_key,
            model: model.to_string(),
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", BASE_URL, self.model)
    }

    fn payload(&self, prompt: &Prompt) -> Value {
        let contents: Vec<Value> = prompt
            .user_turns()
            .into_iter()
            .map(|text| json!({ "role": "user", "parts": [{ "text": text }] }))
            .collect();

        let mut payload = json!({
            "contents": contents,
            "generationConfig": { "temperature": self.temperature }
        });
        if let Some(system) = prompt.system_text() {
            payload["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        payload
    }
}

pub(crate) fn parse_response(json: &Value) -> Result<String, LlmError> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = json["promptFeedback"]["blockReason"]
                .as_str()
                .unwrap_or("no candidates");
            LlmError::Parse(reason.to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let payload = self.payload(prompt);
        tracing::debug!(model = %self.model, "Sending Gemini generateContent");

        let request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key);

        let json = send_json(request, &payload).await?;
        parse_response(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let backend = GeminiBackend::new(Client::new(), "key".into(), "gemini-2.0-flash", 0.2);
        assert!(backend.endpoint().ends_with("/models/gemini-2.0-flash:generateContent"));

        let payload = backend.payload(&Prompt::system_and_user("sys", "usr"));
        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "usr");

        let plain = backend.payload(&Prompt::from("just text"));
        assert!(plain.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Post " }, { "text": "body" }] } }]
        });
        assert_eq!(parse_response(&json).unwrap(), "Post body");

        let blocked = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        match parse_response(&blocked) {
            Err(LlmError::Parse(reason)) => assert_eq!(reason, "SAFETY"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
