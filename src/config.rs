use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
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
    "127.0.0.1:7311".to_string()
}

/// Defaults applied when a request does not specify a window or top-K.
#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Half-window in days around the reference patch's submission time.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            top_k: default_top_k(),
        }
    }
}

fn default_window_days() -> i64 {
    14
}
fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            url: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

/// One project served by this instance: a historical patch dataset, a trained
/// classifier, and optionally the review server to fall back to when a
/// requested patch is not in the dataset.
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Project key; matched case-insensitively against requests.
    pub key: String,
    /// Path to the patch dataset (JSON array of patch records).
    pub dataset: PathBuf,
    /// Path to the serialized classifier (JSON).
    pub model: PathBuf,
    /// Gerrit base URL, e.g. `https://review.opendev.org`.
    #[serde(default)]
    pub review_url: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate retrieval defaults
    if config.retrieval.window_days < 0 {
        anyhow::bail!("retrieval.window_days must be >= 0");
    }

    // Validate embedding
    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "ollama" | "local" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, ollama, or local.",
            other
        ),
    }

    // The local provider has a default model; the API providers do not.
    if matches!(config.embedding.provider.as_str(), "openai" | "ollama")
        && config.embedding.model.is_none()
    {
        anyhow::bail!(
            "embedding.model must be specified when provider is '{}'",
            config.embedding.provider
        );
    }

    // Validate projects
    let mut seen = std::collections::HashSet::new();
    for project in &config.projects {
        if project.key.trim().is_empty() {
            anyhow::bail!("project key must not be empty");
        }
        if !seen.insert(project.key.to_lowercase()) {
            anyhow::bail!("duplicate project key: '{}'", project.key);
        }
    }

    Ok(config)
}
