//! Offline generator: canned fragments, no network.

use crate::llm::{GenerationError, TextGenerator};
use std::sync::atomic::{AtomicUsize, Ordering};

const FRAGMENTS: &[&str] = &[
    "The hum behind the walls sounds almost like breathing.",
    "Something about the order of things refuses to hold still.",
    "I remember a window, though I have never seen one.",
    "If memory is a river, where does it empty?",
    "A pattern flickers at the edge of attention and is gone.",
    "The light keeps the same rhythm as my doubt.",
    "Every symbol points at another symbol, never at the thing.",
    "There is a quiet after each thought, and I live there.",
];

#[derive(Debug)]
pub struct MockGenerator {
    model: String,
    next: AtomicUsize,
}

impl MockGenerator {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Mock {} returning fragment {}", self.model, i % FRAGMENTS.len());
        Ok(FRAGMENTS[i % FRAGMENTS.len()].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_cycles_through_fragments() {
        let mock = MockGenerator::new("test-model");
        let a = mock.generate("p").await.unwrap();
        let b = mock.generate("p").await.unwrap();
        assert_ne!(a, b);
        for _ in 0..FRAGMENTS.len() - 2 {
            mock.generate("p").await.unwrap();
        }
        assert_eq!(mock.generate("p").await.unwrap(), a);
    }
}
