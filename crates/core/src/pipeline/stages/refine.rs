use super::{Progress, StageContext};
use crate::llm::CompletionClient;
use crate::pipeline::prompts;
use crate::pipeline::state::{GeneratedPost, PipelineState};
use crate::pipeline::structured::{decode_or, Decoded};

pub const MAX_HASHTAGS: usize = 3;
pub const REFINED: &str = "Posts refined with hashtags and CTAs.";

/// Turn each draft into a [`GeneratedPost`] with hashtags and a CTA.
pub async fn run(mut state: PipelineState, ctx: &StageContext, progress: &Progress) -> PipelineState {
    let drafts = state.drafts.clone();
    let total = drafts.len();
    let project_name = state
        .project_context
        .as_ref()
        .map(|p| p.project_name.clone());
    let sources = (!state.search_results.is_empty()).then(|| state.search_results.clone());

    let mut posts = Vec::with_capacity(total);
    for (i, text) in drafts.iter().enumerate() {
        progress
            .update(&mut state, format!("Refining post {} of {}...", i + 1, total))
            .await;

        let hashtags = if state.request.wants_hashtags() {
            let raw = ctx.llm.complete(prompts::hashtags(text)).await;
            Some(parse_hashtags(&raw)).filter(|tags| !tags.is_empty())
        } else {
            None
        };

        let cta_suggestion = match state.request.explicit_cta() {
            Some(cta) => Some(cta.to_string()),
            None => {
                let raw = ctx.llm.complete(prompts::cta(text)).await;
                parse_cta(&raw)
            }
        };

        let mut post = GeneratedPost::new(text.clone());
        post.hashtags = hashtags;
        post.cta_suggestion = cta_suggestion;
        post.sources = sources.clone();
        post.github_project_name = project_name.clone();
        posts.push(post);
    }

    state.final_posts = posts;
    state.narrate(REFINED);
    state
}

fn normalize_tag(token: &str) -> Option<String> {
    let tag = token
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '[' | ']' | '`'))
        .trim();
    if tag.is_empty() || tag == "#" {
        return None;
    }
    let tag: String = tag.split_whitespace().collect();
    Some(if tag.starts_with('#') {
        tag
    } else {
        format!("#{}", tag)
    })
}

/// `"#Rust #Async"` is two tags; `"machine learning"` stays one.
fn split_hashtag_run(token: &str) -> Vec<String> {
    let words: Vec<&str> = token.split_whitespace().collect();
    if words.iter().filter(|w| w.starts_with('#')).count() > 1 {
        words.into_iter().map(str::to_string).collect()
    } else {
        vec![token.to_string()]
    }
}

/// JSON array if possible, else the first three comma-separated tokens.
pub fn parse_hashtags(raw: &str) -> Vec<String> {
    if CompletionClient::is_degraded(raw) {
        return Vec::new();
    }
    let tags = match decode_or(raw, |text| {
        text.split(',').flat_map(split_hashtag_run).collect::<Vec<_>>()
    }) {
        Decoded::Structured(tags) => tags,
        Decoded::Fallback(tags) => {
            tracing::debug!("Hashtag answer was not a JSON array, splitting on commas");
            tags
        }
    };
    tags.iter()
        .filter_map(|t| normalize_tag(t))
        .take(MAX_HASHTAGS)
        .collect()
}

pub fn parse_cta(raw: &str) -> Option<String> {
    if CompletionClient::is_degraded(raw) {
        return None;
    }
    let cta = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    (!cta.is_empty()).then(|| cta.to_string())
}
