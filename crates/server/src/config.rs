//! Layered configuration: `.postcraft/config.json`, then environment, then
//! CLI flags. Later layers win.

use std::path::Path;

use anyhow::Context;
use postcraft_core::models::{LlmProvider, ModelConfig};
use postcraft_core::GeneratorConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = ".postcraft/config.json";

/// Partial configuration. Every field is optional so layers can be merged.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searxng_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_max_results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,
}

impl PersistedConfig {
    /// Read the config file. A missing file is an empty layer; an unreadable
    /// or malformed one is logged and ignored.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read config file");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
                Self::default()
            }
        }
    }

    /// Layer taken from `POSTCRAFT_PROVIDER`, `POSTCRAFT_MODEL`,
    /// `POSTCRAFT_BASE_URL`, `SEARXNG_URL` and `GITHUB_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            provider: var("POSTCRAFT_PROVIDER"),
            model: var("POSTCRAFT_MODEL"),
            base_url: var("POSTCRAFT_BASE_URL"),
            searxng_url: var("SEARXNG_URL"),
            github_token: var("GITHUB_TOKEN"),
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: PersistedConfig) {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
        if other.searxng_url.is_some() {
            self.searxng_url = other.searxng_url;
        }
        if other.search_max_results.is_some() {
            self.search_max_results = other.search_max_results;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.github_token.is_some() {
            self.github_token = other.github_token;
        }
    }

    /// Resolve into the generator settings, filling gaps with defaults.
    pub fn resolve(self) -> anyhow::Result<GeneratorConfig> {
        let defaults = GeneratorConfig::default();

        let provider = match self.provider.as_deref() {
            Some(id) => id
                .parse::<LlmProvider>()
                .with_context(|| format!("Unknown provider '{}'", id))?,
            None => LlmProvider::default(),
        };
        let mut model = match self.model {
            Some(name) => ModelConfig::with_provider(provider, name),
            None => ModelConfig::for_provider(provider),
        };
        if let Some(url) = self.base_url {
            model = model.with_base_url(url);
        }
        if let Some(temperature) = self.temperature {
            model.temperature = temperature;
        }

        Ok(GeneratorConfig {
            model,
            searxng_url: self.searxng_url,
            search_max_results: self.search_max_results.unwrap_or(defaults.search_max_results),
            github_token: self.github_token,
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        })
    }
}
