//! # Pipeline
//!
//! Plan, optionally gather context, draft, refine and filter, streaming
//! progress all the way.
//!
//! ## Architecture
//!
//! - `request` / `state` - The request and the per-run state aggregate
//! - `stages/` - One async function per stage
//! - `graph` - Stage order and branch points
//! - `orchestrator` - Runs the graph and reports each step
//! - `stream` - Turns steps into the public event stream

pub mod cleanup;
mod error;
pub mod events;
pub mod graph;
pub mod orchestrator;
pub mod prompts;
pub mod request;
pub mod stages;
pub mod state;
pub mod stream;
pub mod structured;

pub use error::PipelineError;
pub use events::{EventKind, StreamEvent};
pub use graph::Stage;
pub use orchestrator::{Orchestrator, PipelineStep};
pub use request::{GenerationRequest, LengthCategory, RequestError};
pub use stages::guardrail::apply_guardrails;
pub use stages::StageContext;
pub use state::{ContentPlan, GeneratedPost, PipelineState, Source, TokenInfo};
pub use stream::{spawn_generation, StreamAdapter};
