//! # Stage Graph
//!
//! The fixed stage order and its two branch points.

use serde::{Deserialize, Serialize};

use super::state::PipelineState;

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Planning key messages and the search decision
    Plan,
    /// Web search for fresh context
    Search,
    /// Repository metadata lookup
    FetchContext,
    /// Writing the candidate posts
    Draft,
    /// Hashtags and calls-to-action
    Refine,
    /// Denylist and duplicate filtering
    Guardrail,
}

impl Stage {
    pub const INITIAL: Stage = Stage::Plan;

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Search => "search",
            Stage::FetchContext => "fetch_context",
            Stage::Draft => "draft",
            Stage::Refine => "refine",
            Stage::Guardrail => "guardrail",
        }
    }

    /// Stage to run after this one, or `None` once the run is over.
    pub fn next(&self, state: &PipelineState) -> Option<Stage> {
        let has_project = state.request.project_url().is_some();
        match self {
            Stage::Plan if state.should_search => Some(Stage::Search),
            Stage::Plan | Stage::Search if has_project => Some(Stage::FetchContext),
            Stage::Plan | Stage::Search => Some(Stage::Draft),
            Stage::FetchContext => Some(Stage::Draft),
            Stage::Draft => Some(Stage::Refine),
            Stage::Refine => Some(Stage::Guardrail),
            Stage::Guardrail => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
