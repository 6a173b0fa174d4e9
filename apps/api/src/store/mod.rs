//! Profile storage. One canonical profile per account, replaced wholesale on every upload.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::MatchError;
use crate::models::profile::Profile;

/// How many profiles list each skill, grouped case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillFrequencies {
    /// Profiles with at least one skill.
    pub profiles: usize,
    /// (skill name, profile count), unordered.
    pub counts: Vec<(String, usize)>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Inserts or fully replaces the profile for `profile.account_id`.
    async fn put(&self, profile: &Profile) -> Result<(), MatchError>;

    async fn get(&self, account_id: &str) -> Result<Option<Profile>, MatchError>;

    /// Profiles for the given ids that exist; missing ids are simply absent.
    async fn get_many(&self, account_ids: &[String]) -> Result<HashMap<String, Profile>, MatchError>;

    /// Idempotent.
    async fn delete(&self, account_id: &str) -> Result<(), MatchError>;

    async fn count(&self) -> Result<usize, MatchError>;

    async fn skill_frequencies(&self) -> Result<SkillFrequencies, MatchError>;

    fn backend(&self) -> &'static str;
}
