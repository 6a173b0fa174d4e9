use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use crate::embedding::{Embedder, EmbeddingError};
use crate::profile::vocabulary::tokenize;

/// Fixed keys keep vectors stable across processes and Rust versions.
/// Changing them (or the feature set) changes every vector: bump `MODEL_NAME` and re-embed.
const HASH_KEY_0: u64 = 0x0123_4567_89ab_cdef;
const HASH_KEY_1: u64 = 0xfedc_ba98_7654_3210;

const MODEL_NAME: &str = "feature-hash-v1";
const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic feature-hashing embedder. No model download, no network.
///
/// Word unigrams and bigrams are hashed with SipHash-1-3 into signed buckets and the
/// result is L2-normalised, so cosine similarity tracks shared vocabulary.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(feature: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn add(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let h = Self::hash(feature);
        let idx = (h % self.dimension as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel rather than pile up.
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let words: Vec<String> = tokenize(text).into_iter().map(|t| t.lower).collect();

        for word in &words {
            self.add(&mut vector, word, UNIGRAM_WEIGHT);
        }
        for pair in words.windows(2) {
            self.add(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }
        if words.is_empty() {
            // Punctuation-only text still gets a stable, non-zero vector.
            self.add(&mut vector, text.trim(), UNIGRAM_WEIGHT);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vectorize(text))
    }
}
