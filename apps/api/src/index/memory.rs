use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::MatchError;
use crate::index::{check_k, cosine_similarity, IndexEntry, IndexHit, VectorIndex};

struct Slot {
    entry: IndexEntry,
    /// Write sequence number; higher is more recent.
    seq: u64,
}

#[derive(Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    next_seq: u64,
}

/// Exact-scan in-process index. Entries are replaced whole under the write lock,
/// so readers never see a partial entry.
pub struct MemoryVectorIndex {
    dimension: usize,
    inner: RwLock<Inner>,
}

impl MemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            inner: RwLock::new(Inner::default()),
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), MatchError> {
        if vector.len() != self.dimension {
            return Err(MatchError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub async fn get(&self, profile_id: &str) -> Option<IndexEntry> {
        self.inner
            .read()
            .await
            .slots
            .get(profile_id)
            .map(|s| s.entry.clone())
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, entry: IndexEntry) -> Result<(), MatchError> {
        self.check_dimension(&entry.vector)?;
        let mut inner = self.inner.write().await;
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.slots.insert(entry.profile_id.clone(), Slot { entry, seq });
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: i64) -> Result<Vec<IndexHit>, MatchError> {
        let k = check_k(k)?;
        self.check_dimension(vector)?;

        let inner = self.inner.read().await;
        let mut scored: Vec<(f64, u64, &IndexEntry)> = inner
            .slots
            .values()
            .map(|s| (cosine_similarity(vector, &s.entry.vector), s.seq, &s.entry))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(similarity, _, e)| IndexHit {
                profile_id: e.profile_id.clone(),
                account_id: e.account_id.clone(),
                similarity,
            })
            .collect())
    }

    async fn delete(&self, profile_id: &str) -> Result<(), MatchError> {
        self.inner.write().await.slots.remove(profile_id);
        Ok(())
    }

    async fn count(&self) -> Result<usize, MatchError> {
        Ok(self.inner.read().await.slots.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
