//! Pairwise feature vectors for candidate scoring.
//!
//! For each (reference, candidate) pair the builder produces one fixed-shape
//! [`FeatureVector`]: the path-structure statistics from [`crate::path_sim`],
//! the cosine similarity between the two patches' text embeddings, the
//! elapsed time between submissions, and the two file counts. The full batch
//! for a request is consumed together by [`crate::classifier::score_batch`]
//! so column alignment happens once per batch.
//!
//! Embedding is the costly step, so one request embeds the reference and all
//! candidate texts in a single [`crate::embedding::embed_texts`] call; the
//! per-candidate similarity values are identical to embedding each pair
//! separately because the embedding function is deterministic.

use anyhow::{Context, Result};

use crate::config::EmbeddingConfig;
use crate::embedding::{self, cosine_similarity};
use crate::models::PatchRecord;
use crate::path_sim::path_similarity;

/// Canonical column order of a [`FeatureVector`]. This is the schema used
/// when a model declares no expected feature set of its own.
pub const FEATURE_NAMES: [&str; 11] = [
    "jaccard",
    "nb_shared",
    "delta_files",
    "LCP_mean",
    "LCP_max",
    "LCSuff_mean",
    "LCSuff_max",
    "sim_cosine",
    "delta_time_hours",
    "len_A",
    "len_B",
];

/// The fixed set of numeric similarity signals for one (reference, candidate)
/// pair. Side A is the candidate, side B the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub jaccard: f64,
    pub nb_shared: f64,
    pub delta_files: f64,
    pub lcp_mean: f64,
    pub lcp_max: f64,
    pub lcsuff_mean: f64,
    pub lcsuff_max: f64,
    pub sim_cosine: f64,
    pub delta_time_hours: f64,
    pub len_a: f64,
    pub len_b: f64,
}

impl FeatureVector {
    /// Look up a feature by its schema name. Unknown names yield `None` so
    /// the scoring engine can zero-fill columns a model expects but this
    /// builder never produces.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "jaccard" => Some(self.jaccard),
            "nb_shared" => Some(self.nb_shared),
            "delta_files" => Some(self.delta_files),
            "LCP_mean" => Some(self.lcp_mean),
            "LCP_max" => Some(self.lcp_max),
            "LCSuff_mean" => Some(self.lcsuff_mean),
            "LCSuff_max" => Some(self.lcsuff_max),
            "sim_cosine" => Some(self.sim_cosine),
            "delta_time_hours" => Some(self.delta_time_hours),
            "len_A" => Some(self.len_a),
            "len_B" => Some(self.len_b),
            _ => None,
        }
    }

    /// The vector in canonical [`FEATURE_NAMES`] order.
    pub fn natural_row(&self) -> Vec<f64> {
        FEATURE_NAMES
            .iter()
            .map(|name| self.get(name).expect("canonical feature name"))
            .collect()
    }
}

/// Text fed to the embedding model: `title + " " + description`, with absent
/// fields already normalized to empty strings at load time.
pub fn embedding_text(record: &PatchRecord) -> String {
    format!("{} {}", record.title, record.description)
}

/// Build the feature vector for one candidate given its precomputed text
/// similarity against the reference.
pub fn build_feature(
    reference: &PatchRecord,
    candidate: &PatchRecord,
    sim_cosine: f64,
) -> FeatureVector {
    let stats = path_similarity(&candidate.files, &reference.files);
    let delta_seconds = (candidate.created_time - reference.created_time)
        .num_seconds()
        .abs();

    FeatureVector {
        jaccard: stats.jaccard,
        nb_shared: stats.nb_shared as f64,
        delta_files: stats.delta_files as f64,
        lcp_mean: stats.lcp_mean,
        lcp_max: stats.lcp_max,
        lcsuff_mean: stats.lcsuff_mean,
        lcsuff_max: stats.lcsuff_max,
        sim_cosine,
        delta_time_hours: delta_seconds as f64 / 3600.0,
        len_a: candidate.files.len() as f64,
        len_b: reference.files.len() as f64,
    }
}

/// Build one feature vector per candidate, embedding the reference and all
/// candidate texts in a single batch call.
pub async fn build_feature_batch(
    config: &EmbeddingConfig,
    reference: &PatchRecord,
    candidates: &[&PatchRecord],
) -> Result<Vec<FeatureVector>> {
    let mut texts = Vec::with_capacity(candidates.len() + 1);
    texts.push(embedding_text(reference));
    texts.extend(candidates.iter().map(|c| embedding_text(c)));

    let embeddings = embedding::embed_texts(config, &texts)
        .await
        .context("Failed to embed patch texts")?;

    let (reference_embedding, candidate_embeddings) = embeddings
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))?;
    if candidate_embeddings.len() != candidates.len() {
        anyhow::bail!(
            "Embedding response has {} vectors for {} candidates",
            candidate_embeddings.len(),
            candidates.len()
        );
    }

    Ok(candidates
        .iter()
        .zip(candidate_embeddings)
        .map(|(candidate, embedding)| {
            let sim = cosine_similarity(reference_embedding, embedding) as f64;
            build_feature(reference, candidate, sim)
        })
        .collect())
}
