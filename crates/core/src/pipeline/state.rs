//! # Pipeline State
//!
//! The single aggregate threaded through every stage of a run. Each stage
//! reads what it needs and writes only the fields it owns.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::request::GenerationRequest;
use crate::tools::{ProjectDescriptor, SearchHit};

pub const INITIAL_PROGRESS: &str = "Initialization complete.";

/// Planner output. Unknown keys from the model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentPlan {
    /// Points every post should convey
    #[serde(default)]
    pub key_messages: Vec<String>,
    /// Whether fresh information from the web would improve the posts
    #[serde(default)]
    pub needs_web_search: bool,
    /// Query to run when `needs_web_search` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// Suggested post structures (hook, story, list...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structure_ideas: Vec<String>,
    /// Terms worth mentioning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentPlan {
    /// Plan used whenever the model's answer cannot be decoded
    pub fn fallback() -> Self {
        Self {
            key_messages: vec!["Intro, value, CTA".to_string()],
            needs_web_search: false,
            search_query: None,
            structure_ideas: Vec::new(),
            keywords: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Non-blank search query, if the planner gave one
    pub fn query(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// A web page that informed a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub link: String,
}

impl From<SearchHit> for Source {
    fn from(hit: SearchHit) -> Self {
        Self {
            title: hit.title,
            link: hit.link,
        }
    }
}

/// Reserved for usage accounting; always zero for now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A finished post as delivered to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub text: String,
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    #[serde(default)]
    pub cta_suggestion: Option<String>,
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub github_project_name: Option<String>,
}

impl GeneratedPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hashtags: None,
            cta_suggestion: None,
            token_info: Some(TokenInfo::default()),
            sources: None,
            github_project_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    pub request: GenerationRequest,
    pub progress_message: String,
    pub should_search: bool,
    pub search_results: Vec<Source>,
    pub plan: Option<ContentPlan>,
    pub project_context: Option<ProjectDescriptor>,
    pub drafts: Vec<String>,
    pub final_posts: Vec<GeneratedPost>,
}

impl PipelineState {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            progress_message: INITIAL_PROGRESS.to_string(),
            should_search: false,
            search_results: Vec::new(),
            plan: None,
            project_context: None,
            drafts: Vec::new(),
            final_posts: Vec::new(),
        }
    }

    pub fn narrate(&mut self, message: impl Into<String>) {
        self.progress_message = message.into();
    }
}
