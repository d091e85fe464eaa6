//! # Context Providers
//!
//! External lookups the pipeline uses to ground drafts:
//! - `search` - topic web search (SearXNG)
//! - `github` - repository metadata (GitHub REST API)

pub mod github;
pub mod search;

pub use github::{
    GithubProjectLookup, ProjectDescriptor, ProjectLookupError, ProjectMetadataProvider,
};
pub use search::{SearchHit, SearchProvider, SearxngSearch};
