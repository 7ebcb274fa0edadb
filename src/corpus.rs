//! Per-project patch corpus loaded from disk.
//!
//! A corpus is the in-memory set of historical patches for one project,
//! loaded once at startup from a JSON dataset file and held read-only for the
//! process lifetime. Records missing `patch_id` or `created_time` are dropped
//! at load time, and file lists are parsed once here rather than per request.
//!
//! Datasets exported from the original review-mining pipeline sometimes carry
//! the `files` column as a stringified list (`"['a/b.py', 'c.py']"`) instead
//! of a JSON array; the loader accepts both and treats anything unparseable
//! as an empty list.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::models::PatchRecord;

/// Timestamp formats accepted in datasets and Gerrit payloads.
const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a timezone-naive timestamp, falling back to a bare date at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Raw dataset record before validation and normalization.
#[derive(Debug, Deserialize)]
struct RawPatchRecord {
    #[serde(default)]
    patch_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_time: Option<String>,
    #[serde(default)]
    files: Option<FilesField>,
}

/// `files` arrives either as a JSON array or as a stringified list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FilesField {
    List(Vec<String>),
    Text(String),
}

impl FilesField {
    fn into_paths(self) -> Vec<String> {
        match self {
            FilesField::List(list) => list,
            FilesField::Text(text) => parse_files_text(&text),
        }
    }
}

fn parse_files_text(text: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(text) {
        return list;
    }
    // Python-repr lists use single quotes.
    let swapped = text.replace('\'', "\"");
    serde_json::from_str(&swapped).unwrap_or_default()
}

/// The in-memory patch history for one project.
///
/// Immutable after load; lookups by id and window scans share the same
/// record storage. Duplicate ids keep the first occurrence.
#[derive(Debug)]
pub struct Corpus {
    records: Vec<PatchRecord>,
    by_id: HashMap<String, usize>,
    dropped: usize,
}

impl Corpus {
    /// Load a corpus from a JSON dataset file (an array of patch records).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
        let raw: Vec<RawPatchRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset file: {}", path.display()))?;
        Ok(Self::from_raw(raw))
    }

    /// Build a corpus from already-validated records (duplicates keep the
    /// first occurrence). Useful when records come from somewhere other than
    /// a dataset file.
    pub fn from_records(records: Vec<PatchRecord>) -> Self {
        let mut by_id = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            by_id.entry(record.patch_id.clone()).or_insert(index);
        }
        Self {
            records,
            by_id,
            dropped: 0,
        }
    }

    fn from_raw(raw: Vec<RawPatchRecord>) -> Self {
        let mut records = Vec::with_capacity(raw.len());
        let mut by_id = HashMap::new();
        let mut dropped = 0;

        for record in raw {
            let patch_id = match record.patch_id {
                Some(id) if !id.trim().is_empty() => id.trim().to_string(),
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            let created_time = match record.created_time.as_deref().and_then(parse_timestamp) {
                Some(ts) => ts,
                None => {
                    dropped += 1;
                    continue;
                }
            };

            let index = records.len();
            records.push(PatchRecord {
                patch_id: patch_id.clone(),
                title: record.title.unwrap_or_default(),
                description: record.description.unwrap_or_default(),
                created_time,
                files: record.files.map(FilesField::into_paths).unwrap_or_default(),
            });
            by_id.entry(patch_id).or_insert(index);
        }

        Self {
            records,
            by_id,
            dropped,
        }
    }

    /// Look up a patch by exact id.
    pub fn get(&self, patch_id: &str) -> Option<&PatchRecord> {
        self.by_id.get(patch_id).map(|&i| &self.records[i])
    }

    /// All admitted records, in dataset order.
    pub fn records(&self) -> &[PatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records rejected at load time for a missing id or timestamp.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
