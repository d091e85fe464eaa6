//! Offline backend for local runs and tests.
//!
//! Recognises the pipeline's own prompts by their instructions and answers
//! each with plausible canned content. Draft answers depend on the variation
//! index in the prompt, so a run never collapses into duplicates.

use async_trait::async_trait;
use serde_json::json;

use super::{CompletionBackend, LlmError, Prompt};

const OPENERS: [&str; 5] = [
    "Three lessons on {topic} that changed how I work.",
    "Most teams underestimate {topic}.",
    "A short story about {topic} from last quarter.",
    "If you only learn one thing about {topic} this year, make it this.",
    "Five myths about {topic}, debunked.",
];

const RECENCY_WORDS: [&str; 5] = ["latest", "news", "trend", "this week", "today"];

#[derive(Debug, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

fn field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn plan(user: &str) -> String {
    let topic = field(user, "Topic:").unwrap_or("this topic");
    let lower = topic.to_lowercase();
    let needs_web_search = RECENCY_WORDS.iter().any(|w| lower.contains(w));
    let search_query = if needs_web_search {
        format!("{} latest developments", topic)
    } else {
        String::new()
    };

    json!({
        "key_messages": [
            format!("Why {} matters", topic),
            format!("A practical lesson about {}", topic),
            "What to try next"
        ],
        "structure_ideas": ["Hook", "Insight", "Call to action"],
        "keywords": [topic],
        "needs_web_search": needs_web_search,
        "search_query": search_query
    })
    .to_string()
}

fn draft(user: &str) -> String {
    let topic = field(user, "Topic:").unwrap_or("this topic");
    let variation: usize = field(user, "Variation:")
        .and_then(|v| v.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);
    let opener = OPENERS[(variation.max(1) - 1) % OPENERS.len()].replace("{topic}", topic);

    let mut post = format!(
        "{}\n\nGetting {} right is less about tools and more about habits. \
         Start small, measure the impact and share what you learn with your team.",
        opener, topic
    );
    if let Some(project) = field(user, "Project name:") {
        post.push_str(&format!("\n\nWe put this into practice in {}.", project));
    }
    let emojis = field(user, "Emojis:").unwrap_or("no emojis");
    if !emojis.contains("no emojis") {
        post.push_str(" 🚀");
    }
    post
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let system = prompt.system_text().unwrap_or_default().to_lowercase();
        let user = prompt.user_turns().join("\n");

        let answer = if system.contains("key_messages") {
            plan(&user)
        } else if system.contains("post writer") {
            draft(&user)
        } else if system.contains("hashtag") {
            json!(["#Learning", "#Technology", "#CareerGrowth"]).to_string()
        } else if system.contains("call-to-action") {
            "What has your experience been? Share it in the comments.".to_string()
        } else {
            draft(&user)
        };
        Ok(answer)
    }
}
