use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReverieConfig {
    pub llm: LlmConfig,
    pub scheduler: SchedulerConfig,
    pub perception: PerceptionConfig,
    pub storage: StorageConfig,
}

impl ReverieConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: ReverieConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("REVERIE_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("REVERIE_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("REVERIE_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("REVERIE_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("REVERIE_TICK_SECS") {
            if let Ok(n) = v.parse() {
                self.scheduler.tick_interval_secs = n;
            }
        }
        if let Ok(v) = std::env::var("REVERIE_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("REVERIE_REAL_FEED") {
            self.perception.real_feed = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai", "ollama" or "mock"
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            max_tokens: 120,
            temperature: 0.9,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_secs: u64,
    pub dream_revert_secs: u64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 12,
            dream_revert_secs: 8,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub real_feed: bool,
    pub feed_url: String,
    pub external_probability: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            real_feed: false,
            feed_url: "https://en.wikipedia.org/api/rest_v1/page/random/summary".to_string(),
            external_probability: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// Keep everything in process memory; nothing survives a restart.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "reverie.db".to_string(),
            in_memory: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ReverieConfig::default();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.scheduler.tick_interval_secs, 12);
        assert_eq!(cfg.scheduler.dream_revert_secs, 8);
        assert!(!cfg.perception.real_feed);
        assert!((cfg.perception.external_probability - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
provider = "ollama"
model = "llama3"
"#;
        let cfg: ReverieConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.provider, "ollama");
        assert_eq!(cfg.llm.model, "llama3");
        // Defaults for unspecified fields
        assert_eq!(cfg.llm.max_tokens, 120);
        assert_eq!(cfg.storage.db_path, "reverie.db");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[llm]
provider = "openai"
model = "gpt-4o"
base_url = "https://api.openai.com/v1"
api_key = "sk-test"
max_tokens = 200
temperature = 0.5
timeout_secs = 10

[scheduler]
tick_interval_secs = 3
dream_revert_secs = 4
seed = 42

[perception]
real_feed = true
feed_url = "https://example.com/feed"
external_probability = 0.5

[storage]
db_path = "data/reverie.db"
in_memory = true
"#;
        let cfg: ReverieConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.scheduler.tick_interval_secs, 3);
        assert_eq!(cfg.scheduler.seed, Some(42));
        assert!(cfg.perception.real_feed);
        assert!(cfg.storage.in_memory);
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        // Part 1: env overrides
        std::env::set_var("REVERIE_PROVIDER", "openai");
        std::env::set_var("REVERIE_TICK_SECS", "5");

        let mut cfg = ReverieConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.scheduler.tick_interval_secs, 5);

        std::env::remove_var("REVERIE_PROVIDER");
        std::env::remove_var("REVERIE_TICK_SECS");

        // Part 2: nonexistent path returns defaults (no env interference)
        let cfg = ReverieConfig::load_or_default("/nonexistent/path.toml");
        assert_eq!(cfg.llm.provider, "mock");
    }
}
