//! Similarity-threshold filter applied to results before display
//!
//! This is derived state: the session recomputes it on every read instead
//! of keeping a second, mutable copy of the result list in sync.

use super::data::SearchResult;

/// Return the matches scoring at least `threshold`, in their original order.
///
/// Pure function over the result slice. The service's rank order is
/// preserved; nothing is re-sorted or mutated. An empty slice yields an
/// empty view. Callers are expected to pass a threshold in [0, 1]
/// (`SearchSession::set_threshold` clamps at the source).
pub fn similar_at_least(results: &[SearchResult], threshold: f32) -> Vec<&SearchResult> {
    results
        .iter()
        .filter(|r| r.similarity_score >= threshold)
        .collect()
}
