//! # Generation Request
//!
//! What a caller asks for. Immutable for the lifetime of a run and validated
//! once at the boundary (HTTP handler or CLI).

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_POST_COUNT: u32 = 5;
pub const MAX_EMOJI_LEVEL: u8 = 3;

/// Desired post length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LengthCategory {
    Short,
    #[default]
    Medium,
    Long,
    Any,
}

impl LengthCategory {
    /// Phrase used in the drafting prompt
    pub fn guidance(&self) -> &'static str {
        match self {
            LengthCategory::Short => "brief (around 50-80 words)",
            LengthCategory::Medium => "medium length (around 100-150 words)",
            LengthCategory::Long => "detailed (around 200-250 words)",
            LengthCategory::Any => "appropriate length for LinkedIn",
        }
    }
}

/// Emoji phrase for the drafting prompt. Out-of-range levels use the default.
pub fn emoji_guidance(level: u8) -> &'static str {
    match level {
        0 => "no emojis",
        2 => "a moderate number of relevant emojis",
        3 => "many relevant and expressive emojis",
        _ => "a few relevant emojis",
    }
}

fn default_hashtags_option() -> String {
    "suggest".to_string()
}

fn default_post_count() -> u32 {
    3
}

fn default_emoji_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub audience: Option<Vec<String>>,
    #[serde(default)]
    pub length: LengthCategory,
    /// `"suggest"` enables hashtag generation; anything else disables it
    #[serde(default = "default_hashtags_option")]
    pub hashtags_option: String,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub mimic_examples: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_post_count")]
    pub post_count: u32,
    #[serde(default = "default_emoji_level")]
    pub emoji_level: u8,
    #[serde(default)]
    pub github_project_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("post_count must be between 1 and 5, got {0}")]
    PostCount(u32),

    #[error("emoji_level must be between 0 and 3, got {0}")]
    EmojiLevel(u8),

    #[error("github_project_url must be an absolute http(s) URL: {0}")]
    ProjectUrl(String),
}

impl GenerationRequest {
    /// Request with every optional field at its default
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            tone: None,
            audience: None,
            length: LengthCategory::default(),
            hashtags_option: default_hashtags_option(),
            cta_text: None,
            mimic_examples: None,
            language: None,
            post_count: default_post_count(),
            emoji_level: default_emoji_level(),
            github_project_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.topic.trim().is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        if !(1..=MAX_POST_COUNT).contains(&self.post_count) {
            return Err(RequestError::PostCount(self.post_count));
        }
        if self.emoji_level > MAX_EMOJI_LEVEL {
            return Err(RequestError::EmojiLevel(self.emoji_level));
        }
        if let Some(url) = self.project_url() {
            let parsed =
                reqwest::Url::parse(url).map_err(|_| RequestError::ProjectUrl(url.to_string()))?;
            let web = matches!(parsed.scheme(), "http" | "https");
            if !web || parsed.host_str().is_none() {
                return Err(RequestError::ProjectUrl(url.to_string()));
            }
        }
        Ok(())
    }

    pub fn wants_hashtags(&self) -> bool {
        self.hashtags_option == "suggest"
    }

    /// Caller-supplied CTA, if non-blank
    pub fn explicit_cta(&self) -> Option<&str> {
        non_blank(self.cta_text.as_deref())
    }

    /// Project URL, if non-blank
    pub fn project_url(&self) -> Option<&str> {
        non_blank(self.github_project_url.as_deref())
    }

    pub fn style_sample(&self) -> Option<&str> {
        non_blank(self.mimic_examples.as_deref())
    }

    pub fn language(&self) -> Option<&str> {
        non_blank(self.language.as_deref())
    }

    pub fn tone_or_default(&self) -> &str {
        non_blank(self.tone.as_deref()).unwrap_or("Professional")
    }

    pub fn audience_or_default(&self) -> String {
        match &self.audience {
            Some(audience) if audience.iter().any(|a| !a.trim().is_empty()) => audience
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            _ => "General".to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"topic": "database indexing"}"#).unwrap();
        assert_eq!(request.length, LengthCategory::Medium);
        assert_eq!(request.hashtags_option, "suggest");
        assert_eq!(request.post_count, 3);
        assert_eq!(request.emoji_level, 1);
        assert_eq!(request, GenerationRequest::new("database indexing"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let mut request = GenerationRequest::new("   ");
        assert_eq!(request.validate(), Err(RequestError::EmptyTopic));

        request.topic = "ok".into();
        request.post_count = 0;
        assert_eq!(request.validate(), Err(RequestError::PostCount(0)));
        request.post_count = 6;
        assert_eq!(request.validate(), Err(RequestError::PostCount(6)));

        request.post_count = 5;
        request.emoji_level = 4;
        assert_eq!(request.validate(), Err(RequestError::EmojiLevel(4)));

        request.emoji_level = 0;
        request.github_project_url = Some("github.com/a/b".into());
        assert!(matches!(request.validate(), Err(RequestError::ProjectUrl(_))));

        request.github_project_url = Some("mailto:me@example.com".into());
        assert!(matches!(request.validate(), Err(RequestError::ProjectUrl(_))));

        request.github_project_url = Some("https://example.com/foo".into());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_length_parsing() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"topic": "t", "length": "Long"}"#).unwrap();
        assert_eq!(request.length, LengthCategory::Long);
        assert_eq!(request.length.guidance(), "detailed (around 200-250 words)");
    }

    #[test]
    fn test_prompt_defaults() {
        let mut request = GenerationRequest::new("t");
        assert_eq!(request.tone_or_default(), "Professional");
        assert_eq!(request.audience_or_default(), "General");

        request.audience = Some(vec!["CTOs".into(), " ".into(), "Engineers".into()]);
        assert_eq!(request.audience_or_default(), "CTOs, Engineers");

        request.cta_text = Some("  ".into());
        assert!(request.explicit_cta().is_none());
        request.hashtags_option = "none".into();
        assert!(!request.wants_hashtags());
    }

    #[test]
    fn test_emoji_guidance_table() {
        assert_eq!(emoji_guidance(0), "no emojis");
        assert_eq!(emoji_guidance(1), "a few relevant emojis");
        assert_eq!(emoji_guidance(2), "a moderate number of relevant emojis");
        assert_eq!(emoji_guidance(3), "many relevant and expressive emojis");
    }
}
