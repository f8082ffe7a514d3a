//! similarity scoring and ranking for semantic search
//!
//! ## cosine similarity
//!
//! ```text
//! score = (a · b) / (|a| * |b|)
//! ```
//!
//! degenerate inputs score `0.0` instead of failing: an empty vector, a
//! zero-magnitude vector, or two vectors of different length. no clamping is
//! applied otherwise, so float error can land a hair outside [-1, 1].
//!
//! ## ranking
//!
//! descending by score, ties broken by ascending service id, then truncated to
//! `top_k`. the order is total, so identical inputs always rank identically.

use crate::model::Service;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_TOP_K: usize = 10;

/// cosine similarity between two vectors, `0.0` for non-comparable input.
/// sums run in f64 so large finite components cannot overflow into NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let magnitude_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let magnitude_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    let score = dot / (magnitude_a * magnitude_b);
    if score.is_finite() {
        score as f32
    } else {
        0.0
    }
}

/// one service paired with its score for a single query
#[derive(Debug, Clone, Serialize)]
pub struct ScoredService {
    #[serde(flatten)]
    pub service: Service,
    pub score: f32,
}

fn rank_order(a: &ScoredService, b: &ScoredService) -> Ordering {
    OrderedFloat(b.score)
        .cmp(&OrderedFloat(a.score))
        .then_with(|| a.service.id.cmp(&b.service.id))
}

/// sort best-first and keep the first `top_k`
pub fn rank(mut results: Vec<ScoredService>, top_k: usize) -> Vec<ScoredService> {
    results.sort_by(rank_order);
    results.truncate(top_k);
    results
}
