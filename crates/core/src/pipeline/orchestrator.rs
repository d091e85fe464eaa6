//! # Orchestrator
//!
//! Runs the stage graph for one request and reports the state after every
//! stage over a channel.

use tokio::sync::mpsc;

use super::error::PipelineError;
use super::graph::Stage;
use super::request::GenerationRequest;
use super::stages::{self, Progress, StageContext};
use super::state::PipelineState;

/// Snapshot of the run, sent after a stage (or mid-stage for narration)
#[derive(Debug, Clone)]
pub struct PipelineStep {
    pub stage: Stage,
    pub state: PipelineState,
    /// `true` once `stage` has finished
    pub completed: bool,
}

impl PipelineStep {
    pub fn completed(stage: Stage, state: PipelineState) -> Self {
        Self {
            stage,
            state,
            completed: true,
        }
    }

    pub fn in_progress(stage: Stage, state: PipelineState) -> Self {
        Self {
            stage,
            state,
            completed: false,
        }
    }
}

pub struct Orchestrator {
    ctx: StageContext,
}

impl Orchestrator {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    async fn run_stage(&self, stage: Stage, state: PipelineState, progress: &Progress) -> PipelineState {
        match stage {
            Stage::Plan => stages::plan::run(state, &self.ctx, progress).await,
            Stage::Search => stages::search::run(state, &self.ctx, progress).await,
            Stage::FetchContext => stages::fetch_context::run(state, &self.ctx, progress).await,
            Stage::Draft => stages::draft::run(state, &self.ctx, progress).await,
            Stage::Refine => stages::refine::run(state, &self.ctx, progress).await,
            Stage::Guardrail => stages::guardrail::run(state, &self.ctx, progress).await,
        }
    }

    /// Execute the graph from [`Stage::INITIAL`] to the end.
    ///
    /// Stops with [`PipelineError::Cancelled`] as soon as the receiving side
    /// of `tx` is gone; this is checked before each stage.
    #[tracing::instrument(skip(self, request, tx), fields(topic = %request.topic, posts = request.post_count))]
    pub async fn run(
        &self,
        request: GenerationRequest,
        tx: mpsc::Sender<PipelineStep>,
    ) -> Result<PipelineState, PipelineError> {
        let mut state = PipelineState::new(request);
        let mut current = Some(Stage::INITIAL);

        while let Some(stage) = current {
            if tx.is_closed() {
                tracing::info!(stage = %stage, "Consumer gone, stopping run");
                return Err(PipelineError::Cancelled);
            }

            tracing::debug!(stage = %stage, "Stage started");
            let progress = Progress::new(stage, tx.clone());
            state = self.run_stage(stage, state, &progress).await;
            check_invariants(stage, &state)?;

            current = stage.next(&state);
            tx.send(PipelineStep::completed(stage, state.clone()))
                .await
                .map_err(|_| PipelineError::Cancelled)?;
        }

        tracing::info!(posts = state.final_posts.len(), "Pipeline finished");
        Ok(state)
    }
}

fn check_invariants(stage: Stage, state: &PipelineState) -> Result<(), PipelineError> {
    if state.final_posts.len() > state.drafts.len() {
        return Err(PipelineError::Invariant {
            stage: stage.name(),
            detail: format!(
                "{} final posts but only {} drafts",
                state.final_posts.len(),
                state.drafts.len()
            ),
        });
    }
    Ok(())
}
