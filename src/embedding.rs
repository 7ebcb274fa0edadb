//! Embedding provider abstraction.
//!
//! Patch texts (`title + " " + description`) are turned into fixed-dimension
//! vectors by a pre-trained sentence-embedding model; the pipeline only
//! depends on the call contract (batch of texts → one vector per text,
//! deterministic for fixed model weights) and on [`cosine_similarity`].
//!
//! Supported providers:
//! - **`openai`** — calls the OpenAI embeddings API with retry and backoff.
//! - **`ollama`** — calls a local Ollama instance's `/api/embed` endpoint.
//! - **`local`** — runs models locally via fastembed; no network calls after
//!   model download. Requires the `local-embeddings-fastembed` feature.
//! - **`disabled`** — always returns an error; prediction still works for
//!   requests whose candidate window is empty.
//!
//! # Retry Strategy
//!
//! The HTTP providers use exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Embed a batch of texts using the configured provider.
///
/// Returns one embedding vector per input text, in input order. The whole
/// prediction request is embedded in a single call so the provider can batch
/// the encode; per-text results are unaffected because the embedding function
/// is deterministic.
pub async fn embed_texts(config: &EmbeddingConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    match config.provider.as_str() {
        "openai" => embed_openai(config, texts).await,
        "ollama" => embed_ollama(config, texts).await,
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => embed_local_fastembed(config, texts).await,
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings-fastembed"),
        "disabled" => bail!("Embedding provider is disabled"),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

// ============ OpenAI provider ============

/// Call the OpenAI embeddings API with retry/backoff.
///
/// Sends a batch of texts to `POST https://api.openai.com/v1/embeddings`
/// and returns the embedding vectors in input order. Requires the
/// `OPENAI_API_KEY` environment variable.
async fn embed_openai(config: &EmbeddingConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let api_key =
        std::env::var("OPENAI_API_KEY").map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

    let model = config
        .model
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("embedding.model required"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": model,
        "input": texts,
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s, 8s, ...
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response.json().await?;
                    return parse_openai_response(&json);
                }

                // Rate limited or server error — retry
                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!(
                        "OpenAI API error {}: {}",
                        status,
                        body_text
                    ));
                    continue;
                }

                // Client error (not 429) — don't retry
                let body_text = response.text().await.unwrap_or_default();
                bail!("OpenAI API error {}: {}", status, body_text);
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Embedding failed after retries")))
}

fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing data array"))?;

    let mut embeddings = Vec::with_capacity(data.len());

    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing embedding"))?;

        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        embeddings.push(vec);
    }

    Ok(embeddings)
}

// ============ Ollama provider ============

async fn embed_ollama(config: &EmbeddingConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let model = config
        .model
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("embedding.model required"))?;

    let url = config.url.as_deref().unwrap_or("http://localhost:11434");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": model,
        "input": texts,
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post(format!("{}/api/embed", url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response.json().await?;
                    return parse_ollama_response(&json);
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!(
                        "Ollama API error {}: {}",
                        status,
                        body_text
                    ));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                bail!("Ollama API error {}: {}", status, body_text);
            }
            Err(e) => {
                last_err = Some(anyhow::anyhow!(
                    "Ollama connection error (is Ollama running at {}?): {}",
                    url,
                    e
                ));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Ollama embedding failed after retries")))
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing embeddings array"))?;

    let mut result = Vec::with_capacity(embeddings.len());

    for embedding in embeddings {
        let vec: Vec<f32> = embedding
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: embedding is not an array"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        result.push(vec);
    }

    Ok(result)
}

// ============ Local provider (fastembed) ============

#[cfg(feature = "local-embeddings-fastembed")]
fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "nomic-embed-text-v1" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV1),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        "multilingual-e5-small" => Ok(fastembed::EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(fastembed::EmbeddingModel::MultilingualE5Base),
        "multilingual-e5-large" => Ok(fastembed::EmbeddingModel::MultilingualE5Large),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1, nomic-embed-text-v1.5, \
             multilingual-e5-small, multilingual-e5-base, multilingual-e5-large",
            other
        ),
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
async fn embed_local_fastembed(
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    let model_name = config
        .model
        .clone()
        .unwrap_or_else(|| "all-minilm-l6-v2".to_string());

    let fastembed_model = config_to_fastembed_model(&model_name)?;
    let batch_size = config.batch_size;
    let texts = texts.to_vec();

    tokio::task::spawn_blocking(move || {
        let mut model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed_model).with_show_download_progress(false),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize local embedding model: {}", e))?;

        let embeddings = model
            .embed(texts, Some(batch_size))
            .map_err(|e| anyhow::anyhow!("Local embedding failed: {}", e))?;

        Ok(embeddings)
    })
    .await?
}

// ============ Vector math ============

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`; `0.0` for empty vectors or vectors of
/// different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
