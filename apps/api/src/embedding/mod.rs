//! Embedding Service Adapter: one model, one dimension, shared by the write path
//! (profile summaries) and the read path (query text).
//!
//! Providers implement [`Embedder`]; the rest of the crate only sees [`EmbeddingService`],
//! which enforces the contract: non-empty input, bounded latency, and vectors of exactly
//! the configured dimension.

pub mod hash;
pub mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::errors::MatchError;

/// Provider-level failure. Converted to `EmbeddingUnavailable` at the adapter boundary.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A text embedding provider. Must be deterministic for a fixed model and input.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;
    fn dimension(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Adapter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn Embedder>,
    dimension: usize,
    timeout: Duration,
}

impl EmbeddingService {
    /// Fails with `DimensionMismatch` when the provider's model does not produce
    /// vectors of the configured dimension.
    pub fn new(
        provider: Arc<dyn Embedder>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, MatchError> {
        if provider.dimension() != dimension {
            return Err(MatchError::DimensionMismatch {
                expected: dimension,
                actual: provider.dimension(),
            });
        }
        Ok(Self {
            provider,
            dimension,
            timeout,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        if text.trim().is_empty() {
            return Err(MatchError::EmptyInput);
        }

        let vector = tokio::time::timeout(self.timeout, self.provider.embed(text))
            .await
            .map_err(|_| {
                MatchError::EmbeddingUnavailable(format!(
                    "embedding timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| MatchError::EmbeddingUnavailable(e.to_string()))?;

        self.check_vector(&vector)?;
        debug!(
            model = self.provider.model_name(),
            chars = text.len(),
            "Embedded text"
        );
        Ok(vector)
    }

    /// Validates a vector before it is written anywhere.
    pub fn check_vector(&self, vector: &[f32]) -> Result<(), MatchError> {
        if vector.len() != self.dimension {
            return Err(MatchError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(MatchError::EmbeddingUnavailable(
                "provider returned non-finite components".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::hash::HashEmbedder;

    /// Claims one dimension, returns another.
    struct Lying;

    #[async_trait]
    impl Embedder for Lying {
        fn model_name(&self) -> &str {
            "lying"
        }
        fn dimension(&self) -> usize {
            4
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![0.5; 3])
        }
    }

    struct Down;

    #[async_trait]
    impl Embedder for Down {
        fn model_name(&self) -> &str {
            "down"
        }
        fn dimension(&self) -> usize {
            4
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "overloaded".into(),
            })
        }
    }

    struct Slow;

    #[async_trait]
    impl Embedder for Slow {
        fn model_name(&self) -> &str {
            "slow"
        }
        fn dimension(&self) -> usize {
            4
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(vec![0.5; 4])
        }
    }

    fn service(provider: impl Embedder + 'static) -> EmbeddingService {
        EmbeddingService::new(Arc::new(provider), 4, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_rejected() {
        let svc = service(HashEmbedder::new(4));
        assert_eq!(svc.embed("").await.unwrap_err(), MatchError::EmptyInput);
        assert_eq!(svc.embed(" \n\t").await.unwrap_err(), MatchError::EmptyInput);
    }

    #[tokio::test]
    async fn test_wrong_length_vector_rejected() {
        let err = service(Lying).embed("hello").await.unwrap_err();
        assert_eq!(
            err,
            MatchError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_provider_dimension_must_match_config() {
        let err = EmbeddingService::new(Arc::new(HashEmbedder::new(8)), 4, Duration::from_secs(1))
            .err()
            .unwrap();
        assert_eq!(err.kind(), "DIMENSION_MISMATCH");
    }

    #[tokio::test]
    async fn test_provider_failure_is_unavailable() {
        let err = service(Down).embed("hello").await.unwrap_err();
        assert_eq!(err.kind(), "EMBEDDING_UNAVAILABLE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_unavailable() {
        let err = service(Slow).embed("hello").await.unwrap_err();
        assert_eq!(err.kind(), "EMBEDDING_UNAVAILABLE");
    }

    #[test]
    fn test_check_vector_rejects_nan() {
        let svc = service(HashEmbedder::new(4));
        assert!(svc.check_vector(&[0.0, f32::NAN, 0.0, 0.0]).is_err());
        assert!(svc.check_vector(&[0.0; 4]).is_ok());
    }
}
