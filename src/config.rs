use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use study_coach_core::context::{ContextLimits, DEFAULT_MAX_CHARS, DEFAULT_MAX_CHUNKS};

pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Defaults for every section; used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// JSON material store written by the ingestion process.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/vectorstore.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl ContextConfig {
    pub fn limits(&self) -> ContextLimits {
        ContextLimits {
            max_chunks: self.max_chunks,
            max_chars: self.max_chars,
        }
    }
}

fn default_max_chunks() -> usize {
    DEFAULT_MAX_CHUNKS
}
fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

/// Generation provider settings. Decoding parameters (temperature, output
/// length) are constants in [`crate::generation`].
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "mistral".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn model_name(&self) -> &str {
        match (&self.model, self.provider.as_str()) {
            (Some(model), _) => model.as_str(),
            (None, "openai") => "gpt-4o-mini",
            (None, _) => "open-mistral-7b",
        }
    }

    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.provider.as_str()) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, "openai") => OPENAI_BASE_URL,
            (None, _) => MISTRAL_BASE_URL,
        }
    }

    pub fn api_key_env(&self) -> &str {
        match (&self.api_key_env, self.provider.as_str()) {
            (Some(var), _) => var.as_str(),
            (None, "openai") => "OPENAI_API_KEY",
            (None, _) => "MISTRAL_API_KEY",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.context.max_chunks == 0 {
        anyhow::bail!("context.max_chunks must be > 0");
    }
    if config.context.max_chars == 0 {
        anyhow::bail!("context.max_chars must be > 0");
    }

    match config.generation.provider.as_str() {
        "disabled" | "mistral" | "openai" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled, mistral, or openai.",
            other
        ),
    }

    if config.generation.is_enabled() && config.generation.timeout_secs == 0 {
        anyhow::bail!("generation.timeout_secs must be > 0");
    }

    Ok(())
}
