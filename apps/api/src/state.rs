use std::sync::Arc;

use serde::Serialize;

use crate::collaborators::github::GithubFetcher;
use crate::config::MatchingConfig;
use crate::embedding::{Embedder, EmbeddingService};
use crate::errors::MatchError;
use crate::index::VectorIndex;
use crate::llm_client::TextGenerator;
use crate::profile::ingest::ProfileService;
use crate::profile::summary::SummaryComposer;
use crate::search::chat::ChatOrchestrator;
use crate::search::service::SearchService;
use crate::store::ProfileStore;

/// Which concrete backends are wired in. Reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    pub profile_store: &'static str,
    pub vector_index: &'static str,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub text_generation: bool,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub search: Arc<SearchService>,
    pub chat: Arc<ChatOrchestrator>,
    pub github: GithubFetcher,
    pub backends: BackendInfo,
}

impl AppState {
    /// Wires the services from their providers. Every component gets the same
    /// embedding adapter, so profile and query vectors always share one model.
    pub fn new(
        cfg: Arc<MatchingConfig>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn ProfileStore>,
        generator: Option<Arc<dyn TextGenerator>>,
        github: GithubFetcher,
    ) -> Result<Self, MatchError> {
        let embedding =
            EmbeddingService::new(embedder, cfg.embedding_dimension, cfg.embed_timeout)?;

        let backends = BackendInfo {
            profile_store: store.backend(),
            vector_index: index.backend(),
            embedding_model: embedding.model_name().to_string(),
            embedding_dimension: embedding.dimension(),
            text_generation: generator.is_some(),
        };

        let summaries = SummaryComposer::new(generator.clone(), cfg.generation_timeout);
        let profiles = ProfileService::new(
            embedding.clone(),
            index.clone(),
            store.clone(),
            summaries,
            cfg.commit_lock_stripes,
        );
        let search = Arc::new(SearchService::new(embedding, index, store, cfg.clone()));
        let chat = ChatOrchestrator::new(search.clone(), generator, cfg.generation_timeout);

        Ok(Self {
            profiles: Arc::new(profiles),
            search,
            chat: Arc::new(chat),
            github,
            backends,
        })
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory backends, hashing embedder, no generator.
    pub fn in_memory(dimension: usize) -> Self {
        use std::time::Duration;

        use crate::embedding::hash::HashEmbedder;
        use crate::index::memory::MemoryVectorIndex;
        use crate::store::memory::MemoryProfileStore;

        let cfg = Arc::new(MatchingConfig {
            embedding_dimension: dimension,
            ..Default::default()
        });
        Self::new(
            cfg,
            Arc::new(HashEmbedder::new(dimension)),
            Arc::new(MemoryVectorIndex::new(dimension)),
            Arc::new(MemoryProfileStore::new()),
            None,
            GithubFetcher::new(None, Duration::from_secs(1)).unwrap(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backends_are_reported() {
        let state = AppState::in_memory(32);
        assert_eq!(state.backends.profile_store, "memory");
        assert_eq!(state.backends.vector_index, "memory");
        assert_eq!(state.backends.embedding_model, "feature-hash-v1");
        assert_eq!(state.backends.embedding_dimension, 32);
        assert!(!state.backends.text_generation);
    }
}
