//! Prompt templates bundled at compile time, plus the builders that fill
//! them from the request and pipeline state.

use std::fmt::Write;

use super::request::{emoji_guidance, GenerationRequest};
use super::state::{ContentPlan, Source};
use crate::llm::Prompt;
use crate::tools::ProjectDescriptor;

/// Planner - decides key messages and whether to search
pub const PLANNER: &str = include_str!("defaults/planner.md");

/// Drafter - writes a single post body
pub const DRAFTER: &str = include_str!("defaults/drafter.md");

/// Hashtags - three tags as a JSON array
pub const HASHTAGS: &str = include_str!("defaults/hashtags.md");

/// CTA - one closing call-to-action
pub const CTA: &str = include_str!("defaults/cta.md");

/// All templates with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("planner", PLANNER),
        ("drafter", DRAFTER),
        ("hashtags", HASHTAGS),
        ("cta", CTA),
    ]
}

fn plan_schema() -> String {
    let schema = schemars::schema_for!(ContentPlan);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

pub fn planner(request: &GenerationRequest) -> Prompt {
    let system = PLANNER.replace("{schema}", &plan_schema());

    let mut user = format!(
        "Topic: {}\nTone: {}\nAudience: {}\nLength: {:?}\n",
        request.topic.trim(),
        request.tone_or_default(),
        request.audience_or_default(),
        request.length,
    );
    if let Some(sample) = request.style_sample() {
        let _ = writeln!(user, "Style sample:\n{}", sample);
    }
    if let Some(language) = request.language() {
        let _ = writeln!(user, "Language: {}", language);
    }
    Prompt::system_and_user(system, user)
}

/// Project block embedded in drafting prompts
pub fn render_project(project: &ProjectDescriptor) -> String {
    let technologies = if project.main_technologies.is_empty() {
        "not specified".to_string()
    } else {
        project.main_technologies.join(", ")
    };
    format!(
        "Project name: {}\nDescription: {}\nTechnologies: {}\nStars: {}\nLink: {}",
        project.project_name, project.description, technologies, project.stars, project.repo_link
    )
}

/// Everything the drafter sees besides the request itself
pub struct DraftContext<'a> {
    pub plan: Option<&'a ContentPlan>,
    pub sources: &'a [Source],
    pub project: Option<&'a ProjectDescriptor>,
}

pub fn drafter(
    request: &GenerationRequest,
    context: &DraftContext<'_>,
    index: u32,
    total: u32,
) -> Prompt {
    let mut user = format!(
        "Topic: {}\nTone: {}\nAudience: {}\nLength: {}\nEmojis: Use {}.\nVariation: {} of {}\n",
        request.topic.trim(),
        request.tone_or_default(),
        request.audience_or_default(),
        request.length.guidance(),
        emoji_guidance(request.emoji_level),
        index,
        total,
    );
    if total > 1 {
        user.push_str("Make this variation clearly different in angle and opening from the others.\n");
    }

    if let Some(plan) = context.plan {
        if !plan.key_messages.is_empty() {
            let _ = writeln!(user, "Key messages: {}", plan.key_messages.join("; "));
        }
        if !plan.structure_ideas.is_empty() {
            let _ = writeln!(user, "Structure ideas: {}", plan.structure_ideas.join("; "));
        }
        if !plan.keywords.is_empty() {
            let _ = writeln!(user, "Keywords: {}", plan.keywords.join(", "));
        }
    }
    if !context.sources.is_empty() {
        user.push_str("Recent sources:\n");
        for source in context.sources {
            let _ = writeln!(user, "- {}", source.title);
        }
    }
    if let Some(project) = context.project {
        let _ = writeln!(user, "\nFeature this project:\n{}", render_project(project));
    }
    if let Some(sample) = request.style_sample() {
        let _ = writeln!(user, "\nMatch the style of this sample:\n{}", sample);
    }
    if let Some(language) = request.language() {
        let _ = writeln!(user, "Write the post in {}.", language);
    }

    Prompt::system_and_user(DRAFTER, user)
}

pub fn hashtags(post: &str) -> Prompt {
    Prompt::system_and_user(HASHTAGS, format!("Post:\n{}", post))
}

pub fn cta(post: &str) -> Prompt {
    Prompt::system_and_user(CTA, format!("Post:\n{}", post))
}
