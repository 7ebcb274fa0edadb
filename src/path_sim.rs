//! Pairwise file-path structure statistics.
//!
//! Two patches that touch the same corner of a source tree are far more
//! likely to be duplicates than patches that touch disjoint subsystems, even
//! when their commit messages read differently. This module compares the file
//! lists of two patches and produces the structural half of the feature
//! vector: set overlap (Jaccard, shared count, size delta) and normalized
//! longest-common-prefix/suffix segment statistics over every file pair.
//!
//! The pairwise loop is O(|A|·|B|), which is acceptable because each call is
//! scoped to a single reference/candidate pair inside a bounded time window.

use std::collections::HashSet;

/// Structural similarity statistics between two ordered file lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStats {
    /// |A ∩ B| / |A ∪ B| over the path sets; 0 when the union is empty.
    pub jaccard: f64,
    /// Number of exactly-equal paths shared by both lists.
    pub nb_shared: usize,
    /// Signed file-count delta, |A| − |B|.
    pub delta_files: i64,
    pub lcp_mean: f64,
    pub lcp_max: f64,
    pub lcsuff_mean: f64,
    pub lcsuff_max: f64,
}

/// Split a path into `/`-delimited segments. Empty paths yield no segments.
fn segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Count of leading segments equal position-by-position, stopping at the
/// first mismatch.
fn lcp(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Like [`lcp`], computed from the trailing segments backward.
fn lcsuff(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Compute all structural statistics between two file lists.
///
/// When either list is empty the four LCP/LCSuff statistics are fixed at 0
/// and the pairwise loop is skipped; the set statistics are still computed
/// from the (possibly empty) sets.
pub fn path_similarity(files_a: &[String], files_b: &[String]) -> PathStats {
    let set_a: HashSet<&str> = files_a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = files_b.iter().map(String::as_str).collect();

    let shared = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    };
    let delta_files = files_a.len() as i64 - files_b.len() as i64;

    if files_a.is_empty() || files_b.is_empty() {
        return PathStats {
            jaccard,
            nb_shared: shared,
            delta_files,
            lcp_mean: 0.0,
            lcp_max: 0.0,
            lcsuff_mean: 0.0,
            lcsuff_max: 0.0,
        };
    }

    let segs_a: Vec<Vec<&str>> = files_a.iter().map(|p| segments(p)).collect();
    let segs_b: Vec<Vec<&str>> = files_b.iter().map(|p| segments(p)).collect();

    let mut lcp_sum = 0.0;
    let mut lcp_max = 0.0f64;
    let mut lcsuff_sum = 0.0;
    let mut lcsuff_max = 0.0f64;

    for a in &segs_a {
        for b in &segs_b {
            // Each pair is normalized by the longer path's segment count.
            let denom = a.len().max(b.len()).max(1) as f64;
            let p = lcp(a, b) as f64 / denom;
            let s = lcsuff(a, b) as f64 / denom;
            lcp_sum += p;
            lcp_max = lcp_max.max(p);
            lcsuff_sum += s;
            lcsuff_max = lcsuff_max.max(s);
        }
    }

    let pairs = (segs_a.len() * segs_b.len()) as f64;

    PathStats {
        jaccard,
        nb_shared: shared,
        delta_files,
        lcp_mean: lcp_sum / pairs,
        lcp_max,
        lcsuff_mean: lcsuff_sum / pairs,
        lcsuff_max,
    }
}
