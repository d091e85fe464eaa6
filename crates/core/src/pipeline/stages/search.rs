use super::{Progress, StageContext};
use crate::pipeline::state::{ContentPlan, PipelineState, Source};

pub const SKIPPED: &str = "Web search skipped as not required.";

/// Look up the plan's query (or the topic) and record the hits as sources.
pub async fn run(mut state: PipelineState, ctx: &StageContext, progress: &Progress) -> PipelineState {
    if !state.should_search {
        state.narrate(SKIPPED);
        return state;
    }

    let query = state
        .plan
        .as_ref()
        .and_then(ContentPlan::query)
        .unwrap_or_else(|| state.request.topic.trim())
        .to_string();

    progress.update(&mut state, "Performing web search...").await;
    let hits = ctx.search.search(&query).await;
    tracing::info!(query = %query, results = hits.len(), "Web search finished");

    state.search_results = hits.into_iter().map(Source::from).collect();
    let found = state.search_results.len();
    state.narrate(format!("Web search complete. Found {} results.", found));
    state
}
