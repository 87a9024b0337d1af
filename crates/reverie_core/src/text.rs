//! Tokenization shared by the concept graph, attention and topic selection.

use regex::Regex;
use std::sync::LazyLock;

static RE_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Words too common to count as concepts when picking attention targets.
const STOPWORDS: &[&str] = &[
    "the", "and", "but", "for", "with", "that", "this", "from", "into", "what", "when", "where",
    "which", "while", "have", "has", "had", "was", "were", "are", "not", "you", "your", "its",
    "they", "them", "then", "than", "there", "here", "just", "like", "about", "some", "all",
    "can", "could", "would", "should", "will", "been", "being", "does", "did", "again", "why",
    "how", "who",
];

/// Lowercase, split on non-word boundaries, keep tokens longer than 2 chars.
/// Order of first appearance is preserved; duplicates are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    RE_NON_WORD
        .split(&text.to_lowercase())
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// [`tokenize`] with duplicates removed, first occurrence wins.
pub fn unique_tokens(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for t in tokenize(text) {
        if !seen.contains(&t) {
            seen.push(t);
        }
    }
    seen
}

/// Unique tokens minus stopwords.
pub fn content_tokens(text: &str) -> Vec<String> {
    unique_tokens(text)
        .into_iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// First content token of `text`, used by the coarse "was this addressed"
/// heuristics on goals, questions and conflicts.
pub fn lead_token(text: &str) -> Option<String> {
    content_tokens(text).into_iter().next()
}

/// Truncate to at most `max` chars, appending an ellipsis when cut.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let s: String = text.chars().take(max).collect();
    format!("{}…", s.trim_end())
}
