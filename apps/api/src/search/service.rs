//! Search pipeline: intent → embed → index query → load profiles → rank.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::MatchingConfig;
use crate::embedding::EmbeddingService;
use crate::errors::MatchError;
use crate::index::VectorIndex;
use crate::models::search::SearchResult;
use crate::profile::vocabulary::SkillVocabulary;
use crate::search::intent::{parse_intent, QueryIntent};
use crate::search::ranking::rank;
use crate::store::ProfileStore;

pub struct SearchService {
    embedder: EmbeddingService,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn ProfileStore>,
    cfg: Arc<MatchingConfig>,
    vocab: &'static SkillVocabulary,
}

impl SearchService {
    pub fn new(
        embedder: EmbeddingService,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn ProfileStore>,
        cfg: Arc<MatchingConfig>,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            cfg,
            vocab: SkillVocabulary::standard(),
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.cfg
    }

    pub fn vocabulary(&self) -> &'static SkillVocabulary {
        self.vocab
    }

    /// Resolves the requested result count.
    ///
    /// Explicit limits must be positive and are clamped to `max_limit`; without one the
    /// query's own hint ("top 3") is used, then `default_limit`.
    pub fn resolve_limit(&self, requested: Option<i64>, hint: Option<usize>) -> Result<usize, MatchError> {
        match requested {
            Some(n) if n <= 0 => Err(MatchError::InvalidLimit(n)),
            Some(n) => Ok(usize::try_from(n).unwrap_or(usize::MAX).min(self.cfg.max_limit)),
            None => Ok(hint.unwrap_or(self.cfg.default_limit).clamp(1, self.cfg.max_limit)),
        }
    }

    /// Free-text candidate search.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<SearchResult>, MatchError> {
        if query.trim().is_empty() {
            return Err(MatchError::EmptyInput);
        }
        let intent = parse_intent(query, self.vocab);
        let limit = self.resolve_limit(limit, intent.limit_hint)?;
        self.run(&intent, limit).await
    }

    /// Candidates for a structured requirement. At least one non-blank skill is required.
    pub async fn match_requirements(
        &self,
        skills: &[String],
        description: &str,
        experience_level: &str,
        limit: Option<i64>,
    ) -> Result<(QueryIntent, Vec<SearchResult>), MatchError> {
        if skills.iter().all(|s| s.trim().is_empty()) {
            return Err(MatchError::EmptyInput);
        }
        let intent = QueryIntent::from_requirements(skills, description, experience_level, self.vocab);
        let limit = self.resolve_limit(limit, None)?;
        let results = self.run(&intent, limit).await?;
        Ok((intent, results))
    }

    /// Retrieves and ranks candidates for an already-parsed intent. Embedding, index and
    /// store failures surface as `RetrievalFailed`.
    pub async fn run(&self, intent: &QueryIntent, limit: usize) -> Result<Vec<SearchResult>, MatchError> {
        let vector = self
            .embedder
            .embed(&intent.query_text)
            .await
            .map_err(MatchError::into_retrieval_failure)?;

        let pool = limit.saturating_mul(self.cfg.candidate_pool_factor).clamp(
            limit,
            self.cfg.max_limit.saturating_mul(self.cfg.candidate_pool_factor).max(limit),
        );
        let hits = self
            .index
            .query(&vector, pool as i64)
            .await
            .map_err(MatchError::into_retrieval_failure)?;

        let ids: Vec<String> = hits.iter().map(|h| h.account_id.clone()).collect();
        let profiles = self
            .store
            .get_many(&ids)
            .await
            .map_err(MatchError::into_retrieval_failure)?;

        let results = rank(intent, &hits, &profiles, &self.cfg, limit);
        debug!(candidates = hits.len(), "Ranked candidate pool");
        info!(
            limit,
            required_skills = intent.required_skills.len(),
            results = results.len(),
            "Search completed"
        );
        Ok(results)
    }
}
