//! Read-only per-project registry of corpora and classifiers.
//!
//! Everything a request needs — the patch corpus, the trained classifier,
//! and the optional review-server fallback URL — is loaded once at startup
//! and held immutable for the process lifetime, so the registry can be
//! shared across concurrent requests behind an `Arc` without locking. Pure
//! pipeline components receive the project by reference; nothing reaches
//! into hidden global state.

use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::classifier::PatchClassifier;
use crate::config::Config;
use crate::corpus::Corpus;

/// One loaded project.
#[derive(Debug)]
pub struct Project {
    pub key: String,
    pub corpus: Corpus,
    pub model: PatchClassifier,
    pub review_url: Option<String>,
}

/// All projects loaded for this serving session, keyed by lowercase project
/// key.
#[derive(Debug, Default)]
pub struct Registry {
    projects: HashMap<String, Project>,
}

impl Registry {
    /// Load every configured project. A project whose dataset or model file
    /// is missing on disk is skipped with a warning rather than failing
    /// startup; a file that exists but cannot be parsed is an error.
    pub fn load(config: &Config) -> Result<Self> {
        let mut projects = HashMap::new();

        for project_config in &config.projects {
            let key = project_config.key.to_lowercase();

            if !project_config.dataset.exists() || !project_config.model.exists() {
                tracing::warn!(
                    "missing dataset or model for project '{}', skipping",
                    key
                );
                continue;
            }

            let corpus = Corpus::load(&project_config.dataset)
                .with_context(|| format!("Failed to load dataset for project '{}'", key))?;
            let model = PatchClassifier::load(&project_config.model)
                .with_context(|| format!("Failed to load model for project '{}'", key))?;

            if corpus.dropped() > 0 {
                tracing::warn!(
                    "project '{}': dropped {} records missing patch_id or created_time",
                    key,
                    corpus.dropped()
                );
            }

            projects.insert(
                key.clone(),
                Project {
                    key,
                    corpus,
                    model,
                    review_url: project_config.review_url.clone(),
                },
            );
        }

        Ok(Self { projects })
    }

    /// Look up a project case-insensitively.
    pub fn get(&self, key: &str) -> Option<&Project> {
        self.projects.get(&key.to_lowercase())
    }

    /// Loaded project keys, sorted for stable output.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.projects.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatchRecord;

    fn project(key: &str) -> Project {
        Project {
            key: key.to_string(),
            corpus: Corpus::from_records(Vec::<PatchRecord>::new()),
            model: PatchClassifier {
                feature_names: None,
                coefficients: vec![0.0],
                intercept: 0.0,
            },
            review_url: None,
        }
    }

    fn registry_of(keys: &[&str]) -> Registry {
        let mut projects = HashMap::new();
        for key in keys {
            projects.insert(key.to_string(), project(key));
        }
        Registry { projects }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = registry_of(&["openstack"]);
        assert!(registry.get("openstack").is_some());
        assert!(registry.get("OpenStack").is_some());
        assert!(registry.get("qt").is_none());
    }

    #[test]
    fn test_keys_sorted() {
        let registry = registry_of(&["qt", "android", "openstack"]);
        assert_eq!(registry.keys(), vec!["android", "openstack", "qt"]);
    }
}
