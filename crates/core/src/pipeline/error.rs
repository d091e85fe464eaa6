use thiserror::Error;

/// Failures that end a run. Each becomes a single ERROR event.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("consumer disconnected")]
    Cancelled,

    #[error("invariant violated after {stage}: {detail}")]
    Invariant { stage: &'static str, detail: String },

    #[error("pipeline task failed: {0}")]
    Task(String),
}
