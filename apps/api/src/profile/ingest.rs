//! Profile ingest: normalize, summarize, embed, then commit to the store and the index.
//!
//! Commit protocol (per account, under a striped lock):
//! 1. read the prior profile
//! 2. upsert the index entry (atomic replace)
//! 3. write the profile
//! 4. if step 3 fails, put the prior index entry back (or delete it) so the prior
//!    profile and its vector stay exactly as they were
//!
//! Everything before the commit is side-effect free, so `InsufficientInput` and
//! embedding failures never touch storage.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info};

use crate::embedding::EmbeddingService;
use crate::errors::MatchError;
use crate::index::{IndexEntry, VectorIndex};
use crate::models::profile::Profile;
use crate::profile::analytics::{skill_analytics, SkillAnalytics, TOP_SKILLS};
use crate::profile::normalizer::{normalize, ProfileSources};
use crate::profile::summary::SummaryComposer;
use crate::profile::vocabulary::SkillVocabulary;
use crate::store::ProfileStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub sources: ProfileSources,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub account_id: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub skill_count: usize,
    pub certification_count: usize,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<&Profile> for IngestResponse {
    fn from(p: &Profile) -> Self {
        Self {
            account_id: p.account_id.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            summary: p.summary.clone(),
            skill_count: p.skills.len(),
            certification_count: p.certifications.len(),
            updated_at: p.updated_at,
        }
    }
}

/// The caller-supplied value, or the one found in the sources when it is blank.
fn contact_or(supplied: &str, extracted: Option<String>) -> String {
    match supplied.trim() {
        "" => extracted.unwrap_or_default(),
        given => given.to_string(),
    }
}

/// Async mutexes striped by account id. Same account → same stripe; different accounts
/// usually land on different stripes and never wait on each other for long.
pub struct CommitLocks {
    stripes: Vec<Mutex<()>>,
}

impl CommitLocks {
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub async fn acquire(&self, account_id: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        account_id.hash(&mut hasher);
        let idx = (hasher.finish() % self.stripes.len() as u64) as usize;
        self.stripes[idx].lock().await
    }
}

pub struct ProfileService {
    embedder: EmbeddingService,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn ProfileStore>,
    summaries: SummaryComposer,
    locks: CommitLocks,
    vocab: &'static SkillVocabulary,
}

impl ProfileService {
    pub fn new(
        embedder: EmbeddingService,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn ProfileStore>,
        summaries: SummaryComposer,
        lock_stripes: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            summaries,
            locks: CommitLocks::new(lock_stripes),
            vocab: SkillVocabulary::standard(),
        }
    }

    /// Builds the canonical profile for `account_id` and replaces whatever was stored.
    pub async fn ingest(&self, account_id: &str, request: IngestRequest) -> Result<Profile, MatchError> {
        let normalized = normalize(&request.sources, self.vocab)?;
        let summary = self
            .summaries
            .compose(&request.display_name, &normalized)
            .await;
        let embedding = self.embedder.embed(&summary).await?;

        let profile = Profile {
            account_id: account_id.to_string(),
            display_name: request.display_name.trim().to_string(),
            email: contact_or(&request.email, normalized.email),
            phone: normalized.phone.unwrap_or_default(),
            summary,
            skills: normalized.skills,
            certifications: normalized.certifications,
            experience: normalized.experience,
            education: normalized.education,
            experience_years: normalized.experience_years,
            embedding,
            updated_at: Utc::now(),
        };

        self.commit(&profile).await?;

        info!(
            account_id,
            skills = profile.skills.len(),
            certifications = profile.certifications.len(),
            dimension = profile.embedding.len(),
            "Profile ingested"
        );
        Ok(profile)
    }

    async fn commit(&self, profile: &Profile) -> Result<(), MatchError> {
        let account_id = profile.account_id.as_str();
        let _guard = self.locks.acquire(account_id).await;

        let prior = self.store.get(account_id).await?;

        self.index
            .upsert(IndexEntry {
                profile_id: account_id.to_string(),
                account_id: account_id.to_string(),
                vector: profile.embedding.clone(),
            })
            .await?;

        if let Err(e) = self.store.put(profile).await {
            self.restore_index(account_id, prior.as_ref()).await;
            return Err(e);
        }
        Ok(())
    }

    /// Puts the index back in line with the prior stored profile after a failed write.
    async fn restore_index(&self, account_id: &str, prior: Option<&Profile>) {
        let restored = match prior.filter(|p| p.is_indexable()) {
            Some(p) => {
                self.index
                    .upsert(IndexEntry {
                        profile_id: account_id.to_string(),
                        account_id: account_id.to_string(),
                        vector: p.embedding.clone(),
                    })
                    .await
            }
            None => self.index.delete(account_id).await,
        };
        if let Err(e) = restored {
            error!(account_id, "Failed to restore index entry after aborted ingest: {e}");
        }
    }

    pub async fn get(&self, account_id: &str) -> Result<Option<Profile>, MatchError> {
        self.store.get(account_id).await
    }

    /// Most common skills across stored profiles.
    pub async fn skill_analytics(&self) -> Result<SkillAnalytics, MatchError> {
        skill_analytics(self.store.as_ref(), self.vocab, TOP_SKILLS).await
    }

    /// Removes the profile, then its index entry. Idempotent.
    ///
    /// A failed store delete leaves both in place; an index entry left behind by a failed
    /// index delete is skipped at ranking time because its profile is gone.
    pub async fn delete(&self, account_id: &str) -> Result<(), MatchError> {
        let _guard = self.locks.acquire(account_id).await;
        self.store.delete(account_id).await?;
        self.index.delete(account_id).await?;
        info!(account_id, "Profile deleted");
        Ok(())
    }
}
