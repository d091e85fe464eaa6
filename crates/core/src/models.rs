//! # Postcraft Models
//!
//! LLM provider selection for the completion client. The provider is an
//! explicit configuration value; resolving it into a backend happens once at
//! startup and a failure there is fatal.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::anthropic::AnthropicBackend;
use crate::llm::gemini::GeminiBackend;
use crate::llm::mock::MockBackend;
use crate::llm::openai::OpenAiCompatibleBackend;
use crate::llm::{CompletionBackend, CompletionClient, LlmError};

/// Supported LLM providers
///
/// Each HTTP provider reads its API key from the environment:
/// - Anthropic (Claude) - `ANTHROPIC_API_KEY`
/// - OpenAI (GPT) - `OPENAI_API_KEY`
/// - Gemini (Google) - `GEMINI_API_KEY`
/// - OpenRouter (Gateway) - `OPENROUTER_API_KEY`
/// - Grok (xAI) - `XAI_API_KEY`
/// - DeepSeek - `DEEPSEEK_API_KEY`
///
/// `Mock` answers offline with canned content and needs no key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    #[default]
    Gemini,
    OpenRouter,
    Grok,
    DeepSeek,
    Mock,
}

impl LlmProvider {
    /// Get all available providers
    pub fn all() -> Vec<LlmProvider> {
        vec![
            LlmProvider::Anthropic,
            LlmProvider::OpenAI,
            LlmProvider::Gemini,
            LlmProvider::OpenRouter,
            LlmProvider::Grok,
            LlmProvider::DeepSeek,
            LlmProvider::Mock,
        ]
    }

    /// Stable identifier used in config files and CLI flags
    pub fn id(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::Grok => "grok",
            LlmProvider::DeepSeek => "deepseek",
            LlmProvider::Mock => "mock",
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Gemini => "Gemini",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Grok => "Grok",
            LlmProvider::DeepSeek => "DeepSeek",
            LlmProvider::Mock => "Mock",
        }
    }

    /// Model used when the config does not name one
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::OpenRouter => "anthropic/claude-3.5-sonnet",
            LlmProvider::Grok => "grok-2",
            LlmProvider::DeepSeek => "deepseek-chat",
            LlmProvider::Mock => "mock",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Gemini => Some("GEMINI_API_KEY"),
            LlmProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
            LlmProvider::Grok => Some("XAI_API_KEY"),
            LlmProvider::DeepSeek => Some("DEEPSEEK_API_KEY"),
            LlmProvider::Mock => None,
        }
    }

    /// Whether this provider supports custom base URL
    pub fn supports_base_url(&self) -> bool {
        matches!(self, LlmProvider::OpenAI)
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "openai" => Ok(LlmProvider::OpenAI),
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "grok" | "xai" => Ok(LlmProvider::Grok),
            "deepseek" => Ok(LlmProvider::DeepSeek),
            "mock" => Ok(LlmProvider::Mock),
            other => Err(LlmError::Config(format!("unknown LLM provider '{}'", other))),
        }
    }
}

/// Configuration for LLM model selection
///
/// ## Example
/// ```rust,ignore
/// use postcraft_core::models::{ModelConfig, LlmProvider};
///
/// // Default Gemini
/// let config = ModelConfig::default();
///
/// // Specific provider and model
/// let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
///
/// // Create the completion client (fails if the API key is missing)
/// let client = config.create_client(Duration::from_secs(60))?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// LLM provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "gemini-2.0-flash", "gpt-4o"). Empty means the
    /// provider's default.
    #[serde(default)]
    pub model: String,
    /// Optional base URL override for OpenAI-compatible APIs
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::with_provider(LlmProvider::default(), LlmProvider::default().default_model())
    }
}

impl ModelConfig {
    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
            temperature: default_temperature(),
        }
    }

    /// Config for a provider using its default model
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self::with_provider(provider, provider.default_model())
    }

    /// Set base URL (for OpenAI-compatible endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Configured model, or the provider default when unset
    pub fn model_name(&self) -> &str {
        if self.model.trim().is_empty() {
            self.provider.default_model()
        } else {
            self.model.trim()
        }
    }

    /// Resolve the configured provider into a backend.
    ///
    /// Missing API keys are reported here so the process refuses to start
    /// instead of degrading every request.
    pub fn create_backend(
        &self,
        http: reqwest::Client,
    ) -> Result<Arc<dyn CompletionBackend>, LlmError> {
        let backend: Arc<dyn CompletionBackend> = match self.provider {
            LlmProvider::Mock => Arc::new(MockBackend::new()),
            LlmProvider::Anthropic => Arc::new(AnthropicBackend::new(
                http,
                self.api_key()?,
                self.model_name(),
                self.temperature,
            )),
            LlmProvider::Gemini => Arc::new(GeminiBackend::new(
                http,
                self.api_key()?,
                self.model_name(),
                self.temperature,
            )),
            LlmProvider::OpenAI => {
                let mut backend = OpenAiCompatibleBackend::openai(
                    http,
                    self.api_key()?,
                    self.model_name(),
                    self.temperature,
                );
                if let Some(base_url) = &self.base_url {
                    backend = backend.with_base_url(base_url);
                }
                Arc::new(backend)
            }
            LlmProvider::OpenRouter => Arc::new(OpenAiCompatibleBackend::openrouter(
                http,
                self.api_key()?,
                self.model_name(),
                self.temperature,
            )),
            LlmProvider::Grok => Arc::new(OpenAiCompatibleBackend::grok(
                http,
                self.api_key()?,
                self.model_name(),
                self.temperature,
            )),
            LlmProvider::DeepSeek => Arc::new(OpenAiCompatibleBackend::deepseek(
                http,
                self.api_key()?,
                self.model_name(),
                self.temperature,
            )),
        };
        Ok(backend)
    }

    /// Create the completion client used by every pipeline run
    pub fn create_client(&self, timeout: Duration) -> Result<CompletionClient, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;
        let backend = self.create_backend(http)?;
        tracing::info!(
            provider = %self.provider,
            model = %self.model_name(),
            "Completion backend ready"
        );
        Ok(CompletionClient::new(backend))
    }

    fn api_key(&self) -> Result<String, LlmError> {
        let Some(var) = self.provider.env_var() else {
            return Ok(String::new());
        };
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::Config(format!(
                "{} provider selected but {} is not set",
                self.provider.display_name(),
                var
            ))),
        }
    }
}
