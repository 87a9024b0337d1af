use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Prefix of every string that stands in for a failed generation.
pub const MARKER_PREFIX: &str = "[generation error]";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("unauthorized: the API key was rejected")]
    Unauthorized,
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl GenerationError {
    /// The literal string stored in place of a thought.
    pub fn marker(&self) -> String {
        format!("{} {}", MARKER_PREFIX, self)
    }
}

pub fn is_marker(text: &str) -> bool {
    text.starts_with(MARKER_PREFIX)
}

/// Prompt in, one short text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub failed: bool,
}

/// Call the generator and never fail: errors become their marker string.
pub async fn generate_or_marker(generator: &dyn TextGenerator, prompt: &str) -> Generation {
    match generator.generate(prompt).await {
        Ok(text) => {
            let text = tidy(&text);
            if text.is_empty() {
                let e = GenerationError::Malformed("empty completion".to_string());
                tracing::warn!("{} returned nothing usable", generator.name());
                Generation {
                    text: e.marker(),
                    failed: true,
                }
            } else {
                Generation { text, failed: false }
            }
        }
        Err(e) => {
            tracing::warn!("Generation via {} failed: {}", generator.name(), e);
            Generation {
                text: e.marker(),
                failed: true,
            }
        }
    }
}

/// Collapse whitespace and strip quotes models like to wrap fragments in.
fn tidy(text: &str) -> String {
    let collapsed = RE_WHITESPACE.replace_all(text.trim(), " ");
    collapsed
        .trim_matches(|c: char| matches!(c, '"' | '“' | '”' | '\''))
        .trim()
        .to_string()
}
