use super::{Progress, StageContext};
use crate::pipeline::state::PipelineState;
use crate::tools::github::parse_repo_url;
use crate::tools::ProjectLookupError;

pub const SKIPPED: &str = "GitHub scraping skipped (no URL).";

/// Resolve the request's project URL into a descriptor. Failures are
/// narrated and leave `project_context` empty.
pub async fn run(mut state: PipelineState, ctx: &StageContext, progress: &Progress) -> PipelineState {
    let Some(url) = state.request.project_url().map(str::to_string) else {
        state.narrate(SKIPPED);
        return state;
    };

    if parse_repo_url(&url).is_none() {
        tracing::warn!(url = %url, "Project URL is not a GitHub repository");
        state.narrate(failure(&ProjectLookupError::InvalidUrl));
        return state;
    }

    progress
        .update(&mut state, format!("Scraping GitHub project {}...", url))
        .await;

    match ctx.projects.lookup(&url).await {
        Ok(project) => {
            state.narrate(format!("GitHub project '{}' scraped.", project.project_name));
            state.project_context = Some(project);
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Project lookup failed");
            state.narrate(failure(&e));
        }
    }
    state
}

fn failure(error: &ProjectLookupError) -> String {
    format!("GitHub scraping failed: {}", error)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::*;
    use crate::llm::mock::MockBackend;
    use crate::llm::CompletionClient;
    use crate::pipeline::stages::fixtures::{FixedProjects, FixedSearch};
    use crate::pipeline::GenerationRequest;

    fn context(projects: Arc<FixedProjects>) -> StageContext {
        StageContext::new(
            CompletionClient::new(Arc::new(MockBackend::new())),
            Arc::new(FixedSearch::default()),
            projects,
        )
    }

    fn state_with_url(url: Option<&str>) -> PipelineState {
        let mut request = GenerationRequest::new("open source");
        request.github_project_url = url.map(str::to_string);
        PipelineState::new(request)
    }

    #[tokio::test]
    async fn test_no_url_is_skipped() {
        let projects = Arc::new(FixedProjects::default());
        let state = run(state_with_url(None), &context(projects.clone()), &Progress::silent()).await;
        assert_eq!(state.progress_message, SKIPPED);
        assert_eq!(projects.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_github_url_is_recoverable() {
        let projects = Arc::new(FixedProjects::default());
        let state = run(
            state_with_url(Some("https://example.com/foo")),
            &context(projects.clone()),
            &Progress::silent(),
        )
        .await;

        assert!(state.project_context.is_none());
        assert_eq!(state.progress_message, "GitHub scraping failed: Invalid GitHub URL");
        assert_eq!(projects.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_descriptor_stored() {
        let projects = Arc::new(FixedProjects::default());
        let state = run(
            state_with_url(Some("https://github.com/acme/rocket-sled")),
            &context(projects.clone()),
            &Progress::silent(),
        )
        .await;

        let project = state.project_context.as_ref().unwrap();
        assert_eq!(project.project_name, "Rocket Sled");
        assert_eq!(state.progress_message, "GitHub project 'Rocket Sled' scraped.");
        assert_eq!(projects.lookups.load(Ordering::SeqCst), 1);
    }
}
