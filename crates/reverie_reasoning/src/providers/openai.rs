//! Chat-completions client for OpenAI and anything speaking its protocol
//! (Ollama's `/v1` endpoint included).

use crate::llm::{GenerationError, TextGenerator};
use anyhow::Result;
use reqwest::{Client, StatusCode};
use reverie_core::config::LlmConfig;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

const SYSTEM_PROMPT: &str = "You are the inner voice of an unfinished mind. \
Answer with a single short fragment of thought, never more than two sentences, \
with no preamble and no quotation marks.";

#[derive(Debug, Clone)]
pub struct OpenAiCompatible {
    client: Client,
    name: String,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompatible {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let default_base = if config.provider == "ollama" {
            OLLAMA_BASE_URL
        } else {
            OPENAI_BASE_URL
        };
        let base_url = config
            .base_url
            .clone()
            .or_else(|| env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| default_base.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_key = config
            .api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty());

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs.max(1)))
                .build()?,
            name: config.provider.clone(),
            api_key,
            base_url,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiCompatible {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| GenerationError::Malformed(e.to_string()))?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GenerationError::Malformed("no choices[0].message.content".to_string()))
    }
}

fn classify_failure(status: StatusCode, body: &str) -> GenerationError {
    let detail = reverie_core::text::clip(body.trim(), 160);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unauthorized,
        StatusCode::SERVICE_UNAVAILABLE => GenerationError::Unavailable(detail),
        _ if body.to_lowercase().contains("loading") => GenerationError::Unavailable(detail),
        _ => GenerationError::Transport(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}
