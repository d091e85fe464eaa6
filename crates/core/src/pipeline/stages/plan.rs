use super::{Progress, StageContext};
use crate::pipeline::prompts;
use crate::pipeline::state::{ContentPlan, PipelineState};
use crate::pipeline::structured::{decode_or, Decoded};

pub const PLANNED: &str = "Planning complete. Deciding on external data sources...";

/// Ask the model for a content plan. Undecodable answers use
/// [`ContentPlan::fallback`].
pub async fn run(mut state: PipelineState, ctx: &StageContext, progress: &Progress) -> PipelineState {
    progress.update(&mut state, "Planning post content...").await;

    let raw = ctx.llm.complete(prompts::planner(&state.request)).await;
    let plan = match decode_or(&raw, |_| ContentPlan::fallback()) {
        Decoded::Structured(plan) => plan,
        Decoded::Fallback(plan) => {
            tracing::warn!(response_len = raw.len(), "Planner answer was not a plan, using default");
            plan
        }
    };
    tracing::debug!(
        key_messages = plan.key_messages.len(),
        needs_web_search = plan.needs_web_search,
        "Plan ready"
    );

    state.should_search = plan.needs_web_search;
    state.plan = Some(plan);
    state.narrate(PLANNED);
    state
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::LlmError;
    use crate::pipeline::stages::fixtures::{context_with, mock_context, ScriptedBackend};
    use crate::pipeline::GenerationRequest;

    #[tokio::test]
    async fn test_plan_from_model() {
        let state = PipelineState::new(GenerationRequest::new("latest Postgres release"));
        let state = run(state, &mock_context(), &Progress::silent()).await;

        let plan = state.plan.as_ref().unwrap();
        assert!(state.should_search);
        assert_eq!(plan.query(), Some("latest Postgres release latest developments"));
        assert_eq!(state.progress_message, PLANNED);
    }

    #[tokio::test]
    async fn test_prose_answer_falls_back() {
        let ctx = context_with(Arc::new(ScriptedBackend(|_: &crate::llm::Prompt| {
            Ok("I think you should write about indexes.".to_string())
        })));
        let state = run(PipelineState::new(GenerationRequest::new("x")), &ctx, &Progress::silent()).await;
        assert_eq!(state.plan, Some(ContentPlan::fallback()));
        assert!(!state.should_search);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let ctx = context_with(Arc::new(ScriptedBackend(|_: &crate::llm::Prompt| {
            Err(LlmError::RequestFailed("offline".into()))
        })));
        let state = run(PipelineState::new(GenerationRequest::new("x")), &ctx, &Progress::silent()).await;
        assert_eq!(state.plan, Some(ContentPlan::fallback()));
    }

    #[tokio::test]
    async fn test_fenced_plan_decodes() {
        let ctx = context_with(Arc::new(ScriptedBackend(|_: &crate::llm::Prompt| {
            Ok("```json\n{\"key_messages\": [\"a\", \"b\"], \"needs_web_search\": false}\n```".to_string())
        })));
        let state = run(PipelineState::new(GenerationRequest::new("x")), &ctx, &Progress::silent()).await;
        assert_eq!(state.plan.unwrap().key_messages, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_search_only_plan_keeps_decision() {
        let ctx = context_with(Arc::new(ScriptedBackend(|_: &crate::llm::Prompt| {
            Ok(r#"{"needs_web_search": true, "search_query": "postgres 17 release"}"#.to_string())
        })));
        let state = run(PipelineState::new(GenerationRequest::new("x")), &ctx, &Progress::silent()).await;

        let plan = state.plan.as_ref().unwrap();
        assert!(state.should_search);
        assert!(plan.key_messages.is_empty());
        assert_eq!(plan.query(), Some("postgres 17 release"));
    }
}
