//! # Postcraft Core
//!
//! The post generation engine - completion backends, context providers,
//! the stage pipeline and the event stream consumed by the server.
//!
//! ## Architecture
//!
//! - `models` - LLM provider selection (`LlmProvider`, `ModelConfig`)
//! - `llm/` - Text-completion client and its backends
//! - `tools/` - Context providers (web search, GitHub project metadata)
//! - `pipeline/` - Pipeline state, stages, orchestrator and stream adapter
//! - `config` - Runtime configuration shared by the server and CLI
//!
//! ## Usage
//!
//! ```rust,ignore
//! use postcraft_core::config::GeneratorConfig;
//! use postcraft_core::pipeline::{spawn_generation, GenerationRequest};
//!
//! let ctx = GeneratorConfig::default().build_context()?;
//! let mut events = spawn_generation(ctx, GenerationRequest::new("database indexing"));
//! while let Some(event) = events.recv().await {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! ```

pub mod config;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod tools;

pub use config::GeneratorConfig;
pub use llm::{CompletionClient, Prompt};
pub use pipeline::{spawn_generation, GenerationRequest, StageContext, StreamEvent};
