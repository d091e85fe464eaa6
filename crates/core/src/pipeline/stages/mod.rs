//! # Stages
//!
//! Each stage is an async `PipelineState -> PipelineState` function. Stages
//! touch only the state and the collaborators in [`StageContext`].

pub mod draft;
pub mod fetch_context;
pub mod guardrail;
pub mod plan;
pub mod refine;
pub mod search;

use std::sync::Arc;

use tokio::sync::mpsc;

use super::graph::Stage;
use super::orchestrator::PipelineStep;
use super::state::PipelineState;
use crate::llm::CompletionClient;
use crate::tools::{ProjectMetadataProvider, SearchProvider};

/// Collaborators shared by every run. Cheap to clone, read-only.
#[derive(Clone)]
pub struct StageContext {
    pub llm: CompletionClient,
    pub search: Arc<dyn SearchProvider>,
    pub projects: Arc<dyn ProjectMetadataProvider>,
}

impl StageContext {
    pub fn new(
        llm: CompletionClient,
        search: Arc<dyn SearchProvider>,
        projects: Arc<dyn ProjectMetadataProvider>,
    ) -> Self {
        Self {
            llm,
            search,
            projects,
        }
    }
}

/// Narration from inside a stage, surfaced before the stage finishes.
pub struct Progress {
    sink: Option<(Stage, mpsc::Sender<PipelineStep>)>,
}

impl Progress {
    pub fn new(stage: Stage, tx: mpsc::Sender<PipelineStep>) -> Self {
        Self {
            sink: Some((stage, tx)),
        }
    }

    /// Updates only the state, for callers that don't stream.
    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub async fn update(&self, state: &mut PipelineState, message: impl Into<String>) {
        state.narrate(message);
        if let Some((stage, tx)) = &self.sink {
            // A closed channel is picked up at the next stage boundary.
            let _ = tx.send(PipelineStep::in_progress(*stage, state.clone())).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::StageContext;
    use crate::llm::mock::MockBackend;
    use crate::llm::{CompletionBackend, CompletionClient, LlmError, Prompt};
    use crate::tools::github::parse_repo_url;
    use crate::tools::{
        ProjectDescriptor, ProjectLookupError, ProjectMetadataProvider, SearchHit, SearchProvider,
    };

    #[derive(Default)]
    pub struct FixedSearch {
        pub hits: Vec<SearchHit>,
        pub queries: Mutex<Vec<String>>,
    }

    impl FixedSearch {
        pub fn with_hits(count: usize) -> Self {
            Self {
                hits: (1..=count)
                    .map(|i| SearchHit {
                        title: format!("Result {}", i),
                        link: format!("https://example.com/{}", i),
                        snippet: String::new(),
                    })
                    .collect(),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.queries.lock().map(|q| q.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, query: &str) -> Vec<SearchHit> {
            if let Ok(mut queries) = self.queries.lock() {
                queries.push(query.to_string());
            }
            self.hits.clone()
        }
    }

    #[derive(Default)]
    pub struct FixedProjects {
        pub lookups: AtomicUsize,
    }

    #[async_trait]
    impl ProjectMetadataProvider for FixedProjects {
        async fn lookup(&self, url: &str) -> Result<ProjectDescriptor, ProjectLookupError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let (_, repo) = parse_repo_url(url).ok_or(ProjectLookupError::InvalidUrl)?;
            Ok(ProjectDescriptor {
                project_name: crate::tools::github::humanize_repo_name(&repo),
                description: "A test project".to_string(),
                main_technologies: vec!["Rust".to_string()],
                stars: 7,
                repo_link: url.to_string(),
            })
        }
    }

    /// Answers every prompt with a caller-supplied function.
    pub struct ScriptedBackend<F>(pub F);

    #[async_trait]
    impl<F> CompletionBackend for ScriptedBackend<F>
    where
        F: Fn(&Prompt) -> Result<String, LlmError> + Send + Sync,
    {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
            (self.0)(prompt)
        }
    }

    pub fn mock_context() -> StageContext {
        context_with(Arc::new(MockBackend::new()))
    }

    pub fn context_with(backend: Arc<dyn CompletionBackend>) -> StageContext {
        StageContext::new(
            CompletionClient::new(backend),
            Arc::new(FixedSearch::with_hits(2)),
            Arc::new(FixedProjects::default()),
        )
    }
}
