//! Time-window candidate selection.
//!
//! A candidate is any corpus patch submitted within ± `window_days` of the
//! reference patch, excluding the reference itself. Selection imposes no
//! ordering — ranking is decided downstream once scores exist.

use chrono::{Duration, NaiveDateTime};

use crate::corpus::Corpus;
use crate::models::PatchRecord;

/// Select all patches with `created_time` in the inclusive window
/// `[reference_time − window_days, reference_time + window_days]`, excluding
/// the record whose id equals `exclude_id`.
///
/// An empty corpus yields an empty result — that is success, not an error.
pub fn select_candidates<'a>(
    corpus: &'a Corpus,
    reference_time: NaiveDateTime,
    exclude_id: &str,
    window_days: i64,
) -> Vec<&'a PatchRecord> {
    let window = Duration::days(window_days);
    let start = reference_time - window;
    let end = reference_time + window;

    corpus
        .records()
        .iter()
        .filter(|r| r.created_time >= start && r.created_time <= end && r.patch_id != exclude_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::parse_timestamp;

    fn patch_at(id: &str, created: &str) -> PatchRecord {
        PatchRecord {
            patch_id: id.to_string(),
            title: String::new(),
            description: String::new(),
            created_time: parse_timestamp(created).unwrap(),
            files: Vec::new(),
        }
    }

    fn corpus_of(records: Vec<PatchRecord>) -> Corpus {
        Corpus::from_records(records)
    }

    #[test]
    fn test_window_selects_only_nearby_patches() {
        // Reference at day 0, candidates at day 2 and day 20, window 14:
        // only the day-2 patch qualifies.
        let corpus = corpus_of(vec![
            patch_at("ref", "2023-03-01 12:00:00"),
            patch_at("near", "2023-03-03 12:00:00"),
            patch_at("far", "2023-03-21 12:00:00"),
        ]);
        let reference = corpus.get("ref").unwrap();
        let selected = select_candidates(&corpus, reference.created_time, "ref", 14);
        let ids: Vec<&str> = selected.iter().map(|r| r.patch_id.as_str()).collect();
        assert_eq!(ids, vec!["near"]);
    }

    #[test]
    fn test_reference_is_excluded() {
        let corpus = corpus_of(vec![patch_at("ref", "2023-03-01 12:00:00")]);
        let reference = corpus.get("ref").unwrap();
        let selected = select_candidates(&corpus, reference.created_time, "ref", 14);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let corpus = corpus_of(vec![
            patch_at("lower", "2023-02-15 12:00:00"),
            patch_at("upper", "2023-03-15 12:00:00"),
            patch_at("below", "2023-02-15 11:59:59"),
            patch_at("above", "2023-03-15 12:00:01"),
        ]);
        let reference_time = parse_timestamp("2023-03-01 12:00:00").unwrap();
        let selected = select_candidates(&corpus, reference_time, "ref", 14);
        let mut ids: Vec<&str> = selected.iter().map(|r| r.patch_id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["lower", "upper"]);
    }

    #[test]
    fn test_empty_corpus_is_not_an_error() {
        let corpus = corpus_of(vec![]);
        let reference_time = parse_timestamp("2023-03-01 12:00:00").unwrap();
        assert!(select_candidates(&corpus, reference_time, "ref", 14).is_empty());
    }

    #[test]
    fn test_zero_window_keeps_same_instant_only() {
        let corpus = corpus_of(vec![
            patch_at("same", "2023-03-01 12:00:00"),
            patch_at("later", "2023-03-01 12:00:01"),
        ]);
        let reference_time = parse_timestamp("2023-03-01 12:00:00").unwrap();
        let selected = select_candidates(&corpus, reference_time, "ref", 0);
        let ids: Vec<&str> = selected.iter().map(|r| r.patch_id.as_str()).collect();
        assert_eq!(ids, vec!["same"]);
    }
}
