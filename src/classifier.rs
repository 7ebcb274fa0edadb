//! Pre-trained duplicate classifier and batch scoring.
//!
//! Each project ships a binary classifier exported to JSON during training:
//! logistic-regression coefficients, an intercept, and (optionally) the
//! ordered feature-name schema the model was trained on. Scoring aligns a
//! feature batch to that schema and returns the probability of the positive
//! ("is a duplicate") class per candidate.
//!
//! The alignment shim is intentionally lossy: a feature the model declares
//! but the builder never produced is filled with 0, and columns the model
//! does not declare are dropped. Trained models depend on this exact column
//! alignment — do not turn missing columns into errors.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::features::FeatureVector;

/// A serialized per-project binary classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchClassifier {
    /// Ordered feature schema the model expects, when it declares one.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl PatchClassifier {
    /// Load and validate a classifier from a JSON model file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        let model: PatchClassifier = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse model file: {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            bail!("model has no coefficients");
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                bail!(
                    "model declares {} feature names but has {} coefficients",
                    names.len(),
                    self.coefficients.len()
                );
            }
        }
        Ok(())
    }

    /// Number of input columns the model scores.
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Probability of the positive class for one aligned feature row.
    fn proba(&self, row: &[f64]) -> f64 {
        let z: f64 = self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

/// Align a feature batch to the model's expected schema and score it.
///
/// When the model declares `feature_names`, each row is reindexed to exactly
/// that schema: declared features the vector lacks become 0, undeclared
/// columns are dropped. Without a declared schema the vector's natural column
/// order is used and its width must match the model.
///
/// Any failure — width mismatch, non-finite value — fails the whole batch;
/// partial scores are never returned.
pub fn score_batch(model: &PatchClassifier, features: &[FeatureVector]) -> Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(features.len());

    for feature in features {
        let row: Vec<f64> = match &model.feature_names {
            Some(names) => names
                .iter()
                .map(|name| feature.get(name).unwrap_or(0.0))
                .collect(),
            None => feature.natural_row(),
        };

        if row.len() != model.coefficients.len() {
            bail!(
                "feature row has {} columns but the model expects {}",
                row.len(),
                model.coefficients.len()
            );
        }
        if row.iter().any(|v| !v.is_finite()) {
            bail!("non-finite feature value in scoring batch");
        }

        let score = model.proba(&row);
        if !score.is_finite() {
            bail!("model produced a non-finite probability");
        }
        scores.push(score);
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_NAMES;

    fn feature_with(sim_cosine: f64, jaccard: f64) -> FeatureVector {
        FeatureVector {
            jaccard,
            nb_shared: 0.0,
            delta_files: 0.0,
            lcp_mean: 0.0,
            lcp_max: 0.0,
            lcsuff_mean: 0.0,
            lcsuff_max: 0.0,
            sim_cosine,
            delta_time_hours: 0.0,
            len_a: 0.0,
            len_b: 0.0,
        }
    }

    fn sim_only_model() -> PatchClassifier {
        PatchClassifier {
            feature_names: Some(vec!["sim_cosine".to_string()]),
            coefficients: vec![4.0],
            intercept: -2.0,
        }
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let model = sim_only_model();
        let features: Vec<FeatureVector> = [-100.0, -1.0, 0.0, 0.5, 1.0, 100.0]
            .iter()
            .map(|&s| feature_with(s, 0.0))
            .collect();
        let scores = score_batch(&model, &features).unwrap();
        for score in &scores {
            assert!((0.0..=1.0).contains(score), "score out of range: {}", score);
        }
    }

    #[test]
    fn test_higher_similarity_scores_higher() {
        let model = sim_only_model();
        let scores = score_batch(
            &model,
            &[feature_with(0.1, 0.0), feature_with(0.9, 0.0)],
        )
        .unwrap();
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn test_declared_schema_reorders_and_drops() {
        // Model only cares about jaccard then sim_cosine, in that order;
        // every other column is dropped.
        let model = PatchClassifier {
            feature_names: Some(vec!["jaccard".to_string(), "sim_cosine".to_string()]),
            coefficients: vec![1.0, 0.0],
            intercept: 0.0,
        };
        let low = score_batch(&model, &[feature_with(0.99, 0.0)]).unwrap()[0];
        let high = score_batch(&model, &[feature_with(0.0, 1.0)]).unwrap()[0];
        assert!(high > low);
    }

    #[test]
    fn test_missing_declared_feature_zero_filled() {
        // "review_count" was in the training schema but the builder never
        // produces it; it aligns to 0 rather than erroring.
        let model = PatchClassifier {
            feature_names: Some(vec!["sim_cosine".to_string(), "review_count".to_string()]),
            coefficients: vec![1.0, 100.0],
            intercept: 0.0,
        };
        let with_ghost = score_batch(&model, &[feature_with(1.0, 0.0)]).unwrap()[0];
        let sim_only = PatchClassifier {
            feature_names: Some(vec!["sim_cosine".to_string()]),
            coefficients: vec![1.0],
            intercept: 0.0,
        };
        let without = score_batch(&sim_only, &[feature_with(1.0, 0.0)]).unwrap()[0];
        assert!((with_ghost - without).abs() < 1e-12);
    }

    #[test]
    fn test_no_declared_schema_uses_natural_order() {
        let model = PatchClassifier {
            feature_names: None,
            coefficients: vec![0.0; FEATURE_NAMES.len()],
            intercept: 1.0,
        };
        let scores = score_batch(&model, &[feature_with(0.5, 0.5)]).unwrap();
        assert!((scores[0] - 1.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_width_mismatch_fails_whole_batch() {
        let model = PatchClassifier {
            feature_names: None,
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
        };
        assert!(score_batch(&model, &[feature_with(0.5, 0.5)]).is_err());
    }

    #[test]
    fn test_non_finite_feature_fails_whole_batch() {
        let model = sim_only_model();
        let good = feature_with(0.5, 0.0);
        let bad = feature_with(f64::NAN, 0.0);
        assert!(score_batch(&model, &[good, bad]).is_err());
    }

    #[test]
    fn test_validate_rejects_name_coefficient_mismatch() {
        let model = PatchClassifier {
            feature_names: Some(vec!["a".to_string(), "b".to_string()]),
            coefficients: vec![1.0],
            intercept: 0.0,
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_empty_batch_scores_empty() {
        let model = sim_only_model();
        assert!(score_batch(&model, &[]).unwrap().is_empty());
    }
}
