use std::collections::HashSet;

use super::{Progress, StageContext};
use crate::pipeline::state::{GeneratedPost, PipelineState};

/// Posts containing any of these (case-insensitive) are dropped.
pub const BANNED_TERMS: [&str; 3] = ["badword", "get rich quick", "guaranteed returns"];

pub const APPLIED: &str = "Quality guardrails applied.";

fn is_banned(text: &str) -> bool {
    let lower = text.to_lowercase();
    BANNED_TERMS.iter().any(|term| lower.contains(term))
}

/// Drop banned posts and later duplicates. Survivors keep their order.
pub fn apply_guardrails(posts: Vec<GeneratedPost>) -> Vec<GeneratedPost> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|post| !is_banned(&post.text))
        .filter(|post| seen.insert(post.text.trim().to_lowercase()))
        .collect()
}

pub async fn run(mut state: PipelineState, _ctx: &StageContext, progress: &Progress) -> PipelineState {
    progress.update(&mut state, "Applying guardrails...").await;

    let before = state.final_posts.len();
    state.final_posts = apply_guardrails(std::mem::take(&mut state.final_posts));
    tracing::info!(
        kept = state.final_posts.len(),
        dropped = before - state.final_posts.len(),
        "Guardrails applied"
    );

    state.narrate(APPLIED);
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts(texts: &[&str]) -> Vec<GeneratedPost> {
        texts.iter().map(|t| GeneratedPost::new(*t)).collect()
    }

    fn texts(posts: &[GeneratedPost]) -> Vec<&str> {
        posts.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_banned_terms_dropped() {
        let kept = apply_guardrails(posts(&["Clean post", "Contains BadWord here", "Get Rich Quick!"]));
        assert_eq!(texts(&kept), vec!["Clean post"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut input = posts(&["Alpha", "  alpha ", "Beta", "ALPHA"]);
        input[0].cta_suggestion = Some("first".into());
        let kept = apply_guardrails(input);
        assert_eq!(texts(&kept), vec!["Alpha", "Beta"]);
        assert_eq!(kept[0].cta_suggestion.as_deref(), Some("first"));
    }

    #[test]
    fn test_idempotent() {
        let input = posts(&["one", "two", "ONE", "badword", "three", "two "]);
        let once = apply_guardrails(input);
        let twice = apply_guardrails(once.clone());
        assert_eq!(once, twice);
        assert_eq!(texts(&once), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_never_grows() {
        let input = posts(&["a", "b", "c"]);
        assert_eq!(apply_guardrails(input).len(), 3);
        assert!(apply_guardrails(Vec::new()).is_empty());
    }
}
