//! # Structured Output Decoding
//!
//! Models asked for JSON often wrap it in code fences or prose. `decode_or`
//! strips fences, tries the whole body, then the outermost JSON value inside
//! it, and otherwise hands back the caller's fallback.

use serde::de::DeserializeOwned;

/// Outcome of decoding a model response
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Structured(T),
    Fallback(T),
}

impl<T> Decoded<T> {
    pub fn into_inner(self) -> T {
        match self {
            Decoded::Structured(value) | Decoded::Fallback(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decoded::Fallback(_))
    }
}

/// Decode `raw` as `T`, or return `fallback(raw)`.
pub fn decode_or<T, F>(raw: &str, fallback: F) -> Decoded<T>
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> T,
{
    let body = strip_code_fence(raw);
    if let Ok(value) = serde_json::from_str::<T>(body) {
        return Decoded::Structured(value);
    }
    if let Some(inner) = outermost_json(body) {
        if let Ok(value) = serde_json::from_str::<T>(inner) {
            return Decoded::Structured(value);
        }
    }
    Decoded::Fallback(fallback(raw))
}

/// Remove a surrounding markdown code fence (with optional language tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

/// Slice from the first `{` or `[` to the matching last `}` or `]`.
fn outermost_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let decoded: Decoded<Vec<String>> = decode_or(r##"["#a", "#b"]"##, |_| Vec::new());
        assert_eq!(
            decoded,
            Decoded::Structured(vec!["#a".to_string(), "#b".to_string()])
        );
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n{\"x\": 1}\n```";
        let decoded: Decoded<serde_json::Value> = decode_or(raw, |_| serde_json::Value::Null);
        assert!(!decoded.is_fallback());
        assert_eq!(decoded.into_inner()["x"], 1);
    }

    #[test]
    fn test_json_inside_prose() {
        let raw = "Sure! Here you go: [\"#rust\", \"#async\"] hope that helps";
        let decoded: Decoded<Vec<String>> = decode_or(raw, |_| Vec::new());
        assert_eq!(decoded.into_inner(), vec!["#rust", "#async"]);
    }

    #[test]
    fn test_fallback_receives_raw() {
        let decoded: Decoded<String> = decode_or("not json at all", |raw| raw.to_uppercase());
        assert_eq!(decoded, Decoded::Fallback("NOT JSON AT ALL".to_string()));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```\nabc\n```"), "abc");
        assert_eq!(strip_code_fence("  plain  "), "plain");
    }
}
