//! # GitHub Project Lookup
//!
//! Turns a repository URL into a short descriptor the drafter can weave into
//! a post.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const API_BASE: &str = "https://api.github.com";

/// Summary of a source-code project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub project_name: String,
    pub description: String,
    pub main_technologies: Vec<String>,
    pub stars: u64,
    pub repo_link: String,
}

#[derive(Debug, Error)]
pub enum ProjectLookupError {
    #[error("Invalid GitHub URL")]
    InvalidUrl,

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("GitHub API error ({status})")]
    Api { status: u16 },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Response parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait ProjectMetadataProvider: Send + Sync {
    async fn lookup(&self, url: &str) -> Result<ProjectDescriptor, ProjectLookupError>;
}

fn repo_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?github\.com/([^/\s]+)/([^/\s?#]+)")
            .unwrap_or_else(|e| panic!("invalid repository URL pattern: {e}"))
    })
}

/// Extract `(owner, repo)` from a GitHub repository URL.
pub fn parse_repo_url(url: &str) -> Option<(String, String)> {
    let captures = repo_url_pattern().captures(url.trim())?;
    let owner = captures.get(1)?.as_str().to_string();
    let repo = captures
        .get(2)?
        .as_str()
        .trim_end_matches(".git")
        .to_string();
    if repo.is_empty() {
        return None;
    }
    Some((owner, repo))
}

/// `my-cool_repo` -> `My Cool Repo`
pub fn humanize_repo_name(repo: &str) -> String {
    repo.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a descriptor from a `GET /repos/{owner}/{repo}` body.
fn descriptor_from_json(json: &Value, repo: &str, url: &str) -> ProjectDescriptor {
    let mut technologies: Vec<String> = Vec::new();
    if let Some(language) = json.get("language").and_then(|l| l.as_str()) {
        technologies.push(language.to_string());
    }
    if let Some(topics) = json.get("topics").and_then(|t| t.as_array()) {
        for topic in topics.iter().filter_map(|t| t.as_str()) {
            if !technologies.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
                technologies.push(topic.to_string());
            }
        }
    }

    ProjectDescriptor {
        project_name: humanize_repo_name(repo),
        description: json
            .get("description")
            .and_then(|d| d.as_str())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description provided")
            .to_string(),
        main_technologies: technologies,
        stars: json
            .get("stargazers_count")
            .and_then(|s| s.as_u64())
            .unwrap_or(0),
        repo_link: json
            .get("html_url")
            .and_then(|u| u.as_str())
            .unwrap_or(url)
            .to_string(),
    }
}

pub struct GithubProjectLookup {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubProjectLookup {
    pub fn new(token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("postcraft/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_base: API_BASE.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Target a GitHub Enterprise or test server
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ProjectMetadataProvider for GithubProjectLookup {
    async fn lookup(&self, url: &str) -> Result<ProjectDescriptor, ProjectLookupError> {
        let (owner, repo) = parse_repo_url(url).ok_or(ProjectLookupError::InvalidUrl)?;
        let endpoint = format!("{}/repos/{}/{}", self.api_base, owner, repo);

        let mut request = self
            .client
            .get(&endpoint)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProjectLookupError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ProjectLookupError::NotFound(format!("{}/{}", owner, repo)));
        }
        if !status.is_success() {
            return Err(ProjectLookupError::Api {
                status: status.as_u16(),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProjectLookupError::Parse(e.to_string()))?;

        tracing::debug!(owner = %owner, repo = %repo, "Fetched repository metadata");
        Ok(descriptor_from_json(&json, &repo, url))
    }
}
