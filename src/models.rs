//! Core data models used throughout Patch Radar.
//!
//! These types represent the patches and predictions that flow through the
//! candidate-selection and scoring pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;

/// One code-review patch admitted into a project corpus.
///
/// `patch_id` and `created_time` are always present — records missing either
/// are dropped at corpus load time. Review servers report timestamps without
/// a timezone, so `created_time` is naive; it only has to be orderable.
#[derive(Debug, Clone)]
pub struct PatchRecord {
    pub patch_id: String,
    pub title: String,
    pub description: String,
    pub created_time: NaiveDateTime,
    pub files: Vec<String>,
}

/// One ranked prediction returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionEntry {
    pub patch_id: String,
    /// Probability of being a duplicate of the reference patch, in `[0, 1]`.
    pub score: f64,
    /// Submission date of the candidate, `YYYY-MM-DD`.
    pub created_time: String,
    pub title: String,
}
