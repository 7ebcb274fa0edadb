//! Ranking pipeline: candidates → features → scores → top-K.
//!
//! This is the orchestrator behind both the HTTP endpoint and the CLI. For
//! one reference patch it selects the temporal candidate set, builds the
//! pairwise feature batch, scores it with the project's classifier, and
//! returns the top-K entries sorted by score descending.
//!
//! An empty candidate window is a valid empty result, returned before any
//! embedding or scoring work happens. Only three failures are visible to
//! callers: unknown project, unresolvable patch id, and a scoring failure.

use thiserror::Error;

use crate::candidates::select_candidates;
use crate::classifier::score_batch;
use crate::config::EmbeddingConfig;
use crate::features::build_feature_batch;
use crate::models::{PatchRecord, PredictionEntry};
use crate::registry::{Project, Registry};
use crate::remote;

/// Caller-visible pipeline failures. Everything else — including a remote
/// lookup that errors out — degrades into one of these.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Requested project key is not among the loaded projects.
    #[error("project '{0}' is not loaded")]
    UnknownProject(String),
    /// Patch id absent from both the corpus and the review server.
    #[error("patch '{0}' not found in dataset or review API")]
    PatchNotFound(String),
    /// Feature building or model invocation failed; the whole batch fails.
    #[error("scoring failed: {0}")]
    Scoring(#[source] anyhow::Error),
}

/// Resolve the reference patch: exact corpus match first, then the remote
/// lookup when the project has a review URL configured.
pub async fn resolve_reference(
    project: &Project,
    patch_id: &str,
) -> Result<PatchRecord, PredictError> {
    if let Some(record) = project.corpus.get(patch_id) {
        return Ok(record.clone());
    }

    if let Some(url) = &project.review_url {
        if let Some(record) = remote::fetch_patch(url, patch_id).await {
            return Ok(record);
        }
    }

    Err(PredictError::PatchNotFound(patch_id.to_string()))
}

/// Run the pipeline for an already-resolved reference patch.
pub async fn predict_top_k(
    project: &Project,
    embedding: &EmbeddingConfig,
    reference: &PatchRecord,
    top_k: usize,
    window_days: i64,
) -> Result<Vec<PredictionEntry>, PredictError> {
    let candidates = select_candidates(
        &project.corpus,
        reference.created_time,
        &reference.patch_id,
        window_days,
    );
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let features = build_feature_batch(embedding, reference, &candidates)
        .await
        .map_err(PredictError::Scoring)?;
    let scores = score_batch(&project.model, &features).map_err(PredictError::Scoring)?;

    Ok(rank(&candidates, &scores, top_k))
}

/// Resolve the project and reference, then run the pipeline. This is the
/// single entry point used by the HTTP handler and the CLI.
pub async fn run_predict(
    registry: &Registry,
    embedding: &EmbeddingConfig,
    project_key: &str,
    patch_id: &str,
    top_k: usize,
    window_days: i64,
) -> Result<Vec<PredictionEntry>, PredictError> {
    let project = registry
        .get(project_key)
        .ok_or_else(|| PredictError::UnknownProject(project_key.to_string()))?;
    let reference = resolve_reference(project, patch_id).await?;
    predict_top_k(project, embedding, &reference, top_k, window_days).await
}

/// Zip candidates with their scores, stable-sort by score descending, and
/// truncate to `top_k`. The stable sort keeps original candidate iteration
/// order among equal scores, so ties are deterministic.
pub fn rank(candidates: &[&PatchRecord], scores: &[f64], top_k: usize) -> Vec<PredictionEntry> {
    let mut entries: Vec<PredictionEntry> = candidates
        .iter()
        .zip(scores)
        .map(|(candidate, &score)| PredictionEntry {
            patch_id: candidate.patch_id.clone(),
            score,
            created_time: candidate.created_time.format("%Y-%m-%d").to_string(),
            title: candidate.title.clone(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(top_k);
    entries
}
