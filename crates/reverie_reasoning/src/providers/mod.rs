pub mod mock;
pub mod openai;

pub use mock::MockGenerator;
pub use openai::OpenAiCompatible;

use crate::llm::TextGenerator;
use anyhow::Result;
use reverie_core::config::LlmConfig;
use std::sync::Arc;

/// Build the generator named by `config.provider`.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match config.provider.as_str() {
        "openai" | "ollama" => Arc::new(OpenAiCompatible::from_config(config)?),
        "mock" => Arc::new(MockGenerator::new(&config.model)),
        other => anyhow::bail!("Unknown provider: {} (expected openai, ollama or mock)", other),
    };
    tracing::info!("Text generator: {} ({})", config.provider, config.model);
    Ok(generator)
}
