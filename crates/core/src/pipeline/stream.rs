//! # Stream Adapter
//!
//! Translates orchestrator steps into [`StreamEvent`]s and guarantees that
//! every stream ends with exactly one COMPLETE or ERROR.

use tokio::sync::mpsc;

use super::error::PipelineError;
use super::events::{StreamEvent, PROJECT_GATHERED_MESSAGE};
use super::graph::Stage;
use super::orchestrator::{Orchestrator, PipelineStep};
use super::request::GenerationRequest;
use super::stages::StageContext;
use super::state::PipelineState;

const STEP_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Default)]
pub struct StreamAdapter {
    posts_emitted: bool,
}

impl StreamAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for one step, in emission order.
    pub fn translate(&mut self, step: &PipelineStep) -> Vec<StreamEvent> {
        let mut events = vec![StreamEvent::progress(&step.state.progress_message)];
        if !step.completed {
            return events;
        }

        match step.stage {
            Stage::FetchContext => {
                if let Some(project) = &step.state.project_context {
                    match serde_json::to_value(project) {
                        Ok(payload) => events.push(
                            StreamEvent::progress(PROJECT_GATHERED_MESSAGE).with_payload(payload),
                        ),
                        Err(e) => tracing::warn!(error = %e, "Failed to serialize project"),
                    }
                }
            }
            Stage::Guardrail if !self.posts_emitted => {
                self.posts_emitted = true;
                events.extend(step.state.final_posts.iter().map(StreamEvent::post_generated));
            }
            _ => {}
        }
        events
    }

    /// Terminal event for a finished run.
    pub fn finish(result: Result<PipelineState, PipelineError>) -> StreamEvent {
        match result {
            Ok(_) => StreamEvent::complete(),
            Err(PipelineError::Cancelled) => {
                tracing::info!("Pipeline run cancelled");
                StreamEvent::error(PipelineError::Cancelled)
            }
            Err(e) => {
                tracing::error!(error = %e, "Pipeline run failed");
                StreamEvent::error(e)
            }
        }
    }
}

/// Start a run on its own task and return its event stream.
///
/// Dropping the receiver cancels the run at the next stage boundary.
pub fn spawn_generation(ctx: StageContext, request: GenerationRequest) -> mpsc::Receiver<StreamEvent> {
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

    tokio::spawn(async move {
        let (step_tx, mut step_rx) = mpsc::channel(STEP_BUFFER);
        let orchestrator = Orchestrator::new(ctx);
        let run = tokio::spawn(async move { orchestrator.run(request, step_tx).await });

        let mut adapter = StreamAdapter::new();
        loop {
            tokio::select! {
                step = step_rx.recv() => {
                    let Some(step) = step else { break };
                    for event in adapter.translate(&step) {
                        if event_tx.send(event).await.is_err() {
                            tracing::debug!("Stream consumer disconnected");
                            return;
                        }
                    }
                }
                _ = event_tx.closed() => {
                    tracing::debug!("Stream consumer disconnected");
                    return;
                }
            }
        }

        let terminal = match run.await {
            Ok(result) => StreamAdapter::finish(result),
            Err(e) => StreamAdapter::finish(Err(PipelineError::Task(e.to_string()))),
        };
        let _ = event_tx.send(terminal).await;
    });

    event_rx
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::{CompletionBackend, LlmError, Prompt};
    use crate::pipeline::events::EventKind;
    use crate::pipeline::stages::fixtures::{context_with, mock_context, ScriptedBackend};
    use crate::pipeline::state::GeneratedPost;

    async fn collect(ctx: StageContext, request: GenerationRequest) -> Vec<StreamEvent> {
        let mut rx = spawn_generation(ctx, request);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn count(events: &[StreamEvent], kind: EventKind) -> usize {
        events.iter().filter(|e| e.kind == kind).count()
    }

    #[tokio::test]
    async fn test_database_indexing_scenario() {
        let mut request = GenerationRequest::new("database indexing");
        request.post_count = 2;
        request.emoji_level = 0;
        let events = collect(mock_context(), request).await;

        assert_eq!(count(&events, EventKind::PostGenerated), 2);
        assert_eq!(count(&events, EventKind::Complete), 1);
        assert_eq!(count(&events, EventKind::Error), 0);
        assert_eq!(events.last().unwrap().kind, EventKind::Complete);

        let mentions_context = events
            .iter()
            .filter(|e| e.kind == EventKind::Progress)
            .filter_map(|e| e.message.as_deref())
            .any(|m| {
                let m = m.to_lowercase();
                m.contains("search") || m.contains("github")
            });
        assert!(!mentions_context);

        let texts: Vec<String> = events
            .iter()
            .filter(|e| e.kind == EventKind::PostGenerated)
            .map(|e| e.payload.as_ref().unwrap()["text"].as_str().unwrap().to_lowercase())
            .collect();
        assert_ne!(texts[0], texts[1]);
        assert!(texts.iter().all(|t| !t.contains("badword")));
    }

    #[tokio::test]
    async fn test_posts_follow_all_progress() {
        let events = collect(mock_context(), GenerationRequest::new("caching")).await;
        let first_post = events
            .iter()
            .position(|e| e.kind == EventKind::PostGenerated)
            .unwrap();
        assert!(events[..first_post].iter().all(|e| e.kind == EventKind::Progress));
        assert!(events[first_post..]
            .iter()
            .all(|e| e.kind != EventKind::Progress));
        assert_eq!(events[0].message.as_deref(), Some("Planning post content..."));
    }

    #[tokio::test]
    async fn test_non_github_url_scenario() {
        let mut request = GenerationRequest::new("open source maintenance");
        request.github_project_url = Some("https://example.com/foo".into());
        let events = collect(mock_context(), request).await;

        assert!(events.iter().any(|e| {
            e.message.as_deref() == Some("GitHub scraping failed: Invalid GitHub URL")
        }));
        assert!(!events
            .iter()
            .any(|e| e.message.as_deref() == Some(PROJECT_GATHERED_MESSAGE)));
        for event in events.iter().filter(|e| e.kind == EventKind::PostGenerated) {
            assert!(event.payload.as_ref().unwrap()["github_project_name"].is_null());
        }
        assert_eq!(events.last().unwrap().kind, EventKind::Complete);
    }

    #[tokio::test]
    async fn test_project_payload_emitted_once() {
        let mut request = GenerationRequest::new("open source maintenance");
        request.github_project_url = Some("https://github.com/acme/widget-kit".into());
        let events = collect(mock_context(), request).await;

        let gathered: Vec<&StreamEvent> = events
            .iter()
            .filter(|e| e.message.as_deref() == Some(PROJECT_GATHERED_MESSAGE))
            .collect();
        assert_eq!(gathered.len(), 1);
        assert_eq!(gathered[0].payload.as_ref().unwrap()["project_name"], "Widget Kit");
    }

    #[tokio::test]
    async fn test_duplicates_collapse_but_run_completes() {
        let ctx = context_with(Arc::new(ScriptedBackend(|prompt: &Prompt| {
            let system = prompt.system_text().unwrap_or_default();
            if system.contains("key_messages") {
                Ok("not a plan".to_string())
            } else {
                Ok("Same post every time.".to_string())
            }
        })));
        let mut request = GenerationRequest::new("x");
        request.post_count = 4;
        let events = collect(ctx, request).await;

        assert_eq!(count(&events, EventKind::PostGenerated), 1);
        assert_eq!(events.last().unwrap().kind, EventKind::Complete);
    }

    #[tokio::test]
    async fn test_failing_backend_still_completes() {
        let ctx = context_with(Arc::new(ScriptedBackend(|_: &Prompt| {
            Err(LlmError::RequestFailed("offline".into()))
        })));
        let mut request = GenerationRequest::new("x");
        request.post_count = 3;
        let events = collect(ctx, request).await;

        // identical degraded drafts collapse to one
        assert_eq!(count(&events, EventKind::PostGenerated), 1);
        assert_eq!(events.last().unwrap().kind, EventKind::Complete);
    }

    /// Slow planner; counts every call made after planning.
    #[derive(Default)]
    struct SlowPlanner {
        later_calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionBackend for SlowPlanner {
        fn name(&self) -> &'static str {
            "slow-planner"
        }

        async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
            if prompt.system_text().unwrap_or_default().contains("key_messages") {
                tokio::time::sleep(Duration::from_millis(50)).await;
                return Ok(r#"{"key_messages": ["a"]}"#.to_string());
            }
            self.later_calls.fetch_add(1, Ordering::SeqCst);
            Ok("A post.".to_string())
        }
    }

    #[tokio::test]
    async fn test_disconnect_stops_run_before_drafting() {
        let backend = Arc::new(SlowPlanner::default());
        let mut rx = spawn_generation(context_with(backend.clone()), GenerationRequest::new("x"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::Progress);
        drop(rx);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(backend.later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_translate_emits_posts_once() {
        let mut state = PipelineState::new(GenerationRequest::new("x"));
        state.drafts = vec!["a".into(), "b".into()];
        state.final_posts = vec![GeneratedPost::new("a"), GeneratedPost::new("b")];
        let step = PipelineStep::completed(Stage::Guardrail, state);

        let mut adapter = StreamAdapter::new();
        let first = adapter.translate(&step);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].kind, EventKind::Progress);
        assert_eq!(adapter.translate(&step).len(), 1);
    }

    #[test]
    fn test_finish_maps_errors() {
        let event = StreamAdapter::finish(Err(PipelineError::Task("panicked".into())));
        assert_eq!(event.kind, EventKind::Error);
        assert!(event
            .message
            .unwrap()
            .starts_with("Internal Server Error: pipeline task failed"));
    }
}
