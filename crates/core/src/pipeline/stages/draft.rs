use super::{Progress, StageContext};
use crate::pipeline::cleanup::clean_post;
use crate::pipeline::prompts::{self, DraftContext};
use crate::pipeline::state::PipelineState;

pub const DRAFTED: &str = "Initial drafts created.";

/// Write `post_count` drafts, one completion each, in order.
pub async fn run(mut state: PipelineState, ctx: &StageContext, progress: &Progress) -> PipelineState {
    let total = state.request.post_count;
    let mut drafts = Vec::with_capacity(total as usize);

    for index in 1..=total {
        progress
            .update(&mut state, format!("Drafting post {} of {}...", index, total))
            .await;

        let prompt = {
            let context = DraftContext {
                plan: state.plan.as_ref(),
                sources: &state.search_results,
                project: state.project_context.as_ref(),
            };
            prompts::drafter(&state.request, &context, index, total)
        };
        let raw = ctx.llm.complete(prompt).await;
        drafts.push(clean_post(&raw));
    }

    tracing::debug!(drafts = drafts.len(), "Drafting finished");
    state.drafts = drafts;
    state.narrate(DRAFTED);
    state
}
