//! Vector Index: one entry per profile, nearest-neighbour queries by cosine similarity.
//!
//! Backends: `memory` (exact scan, used without a database and in tests) and `postgres`
//! (pgvector). Both give per-id read-after-write: a completed upsert is visible to the
//! next query. Nothing stronger is promised across ids.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::MatchError;

/// A stored vector plus the metadata needed to resolve a hit back to its profile.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub profile_id: String,
    pub account_id: String,
    pub vector: Vec<f32>,
}

/// A query hit. `similarity` is raw cosine in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexHit {
    pub profile_id: String,
    pub account_id: String,
    pub similarity: f64,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replaces any prior entry with the same `profile_id`, atomically.
    async fn upsert(&self, entry: IndexEntry) -> Result<(), MatchError>;

    /// Up to `k` entries, most similar first. Ties go to the most recently written entry.
    /// `k <= 0` fails with `InvalidLimit`.
    async fn query(&self, vector: &[f32], k: i64) -> Result<Vec<IndexHit>, MatchError>;

    /// Idempotent.
    async fn delete(&self, profile_id: &str) -> Result<(), MatchError>;

    async fn count(&self) -> Result<usize, MatchError>;

    /// Short backend label for health output.
    fn backend(&self) -> &'static str;
}

/// Cosine similarity clamped to [-1, 1]. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
}

pub(crate) fn check_k(k: i64) -> Result<usize, MatchError> {
    if k <= 0 {
        return Err(MatchError::InvalidLimit(k));
    }
    Ok(usize::try_from(k).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_check_k() {
        assert_eq!(check_k(0), Err(MatchError::InvalidLimit(0)));
        assert_eq!(check_k(-3), Err(MatchError::InvalidLimit(-3)));
        assert_eq!(check_k(5), Ok(5));
    }
}
