//! # Generator Configuration
//!
//! Everything needed to build a [`StageContext`]: model selection, search
//! and project lookup settings.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::LlmError;
use crate::models::ModelConfig;
use crate::pipeline::StageContext;
use crate::tools::{GithubProjectLookup, SearxngSearch};

fn default_search_max_results() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub model: ModelConfig,
    /// Preferred SearXNG instance, tried before the public fallbacks
    #[serde(default)]
    pub searxng_url: Option<String>,
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,
    /// Raises the GitHub API rate limit when set
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,
    /// Timeout for each completion request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            searxng_url: None,
            search_max_results: default_search_max_results(),
            github_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    /// Build the shared collaborators. Fails only if the completion backend
    /// cannot be constructed.
    pub fn build_context(&self) -> Result<StageContext, LlmError> {
        let llm = self
            .model
            .create_client(Duration::from_secs(self.request_timeout_secs))?;
        let search = SearxngSearch::new(self.searxng_url.as_deref(), self.search_max_results);
        let projects = GithubProjectLookup::new(self.github_token.clone());

        tracing::debug!(
            search_endpoints = search.endpoints().len(),
            github_token = self.github_token.is_some(),
            "Context providers ready"
        );
        Ok(StageContext::new(llm, Arc::new(search), Arc::new(projects)))
    }
}
