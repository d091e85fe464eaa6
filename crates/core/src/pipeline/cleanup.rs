//! Strips model chatter from drafted posts.

const PREAMBLE_PHRASES: [&str; 12] = [
    "here's a post",
    "here is a post",
    "here's a linkedin post",
    "here is a linkedin post",
    "here's your",
    "here is your",
    "here's a draft",
    "here is a draft",
    "sure, here",
    "certainly! here",
    "post:",
    "draft:",
];

/// Lines ending in ':' shorter than this are treated as headings.
const HEADING_MAX_LEN: usize = 60;

const QUOTE_PAIRS: [(char, char); 3] = [('"', '"'), ('\u{201C}', '\u{201D}'), ('\'', '\'')];

fn is_preamble(line: &str) -> bool {
    let lower = line.to_lowercase();
    PREAMBLE_PHRASES.iter().any(|p| lower.contains(p))
        || (line.ends_with(':') && line.chars().count() < HEADING_MAX_LEN)
}

/// True when `close` appears in `inner` as a quote mark rather than as an
/// apostrophe inside a word.
fn has_closing_quote(inner: &str, close: char) -> bool {
    let chars: Vec<char> = inner.chars().collect();
    chars.iter().enumerate().any(|(i, &c)| {
        if c != close {
            return false;
        }
        let in_word = close == '\''
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        !in_word
    })
}

/// Strip one pair of quotes, only if they wrap the whole text.
fn strip_quotes(text: &str) -> &str {
    for (open, close) in QUOTE_PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            if has_closing_quote(inner, close) {
                return text;
            }
            return inner.trim();
        }
    }
    text
}

/// Remove leading preamble lines and one pair of surrounding quotes.
///
/// Text that would become empty is returned trimmed but otherwise intact.
pub fn clean_post(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut lines = trimmed.lines().peekable();
    while let Some(line) = lines.peek() {
        let line = line.trim();
        if line.is_empty() || is_preamble(line) {
            lines.next();
        } else {
            break;
        }
    }
    let body = lines.collect::<Vec<_>>().join("\n");
    let cleaned = strip_quotes(body.trim()).to_string();

    if cleaned.is_empty() {
        trimmed.to_string()
    } else {
        cleaned
    }
}
