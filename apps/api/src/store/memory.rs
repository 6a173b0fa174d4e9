use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::MatchError;
use crate::models::profile::Profile;
use crate::store::{ProfileStore, SkillFrequencies};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn put(&self, profile: &Profile) -> Result<(), MatchError> {
        self.profiles
            .write()
            .await
            .insert(profile.account_id.clone(), profile.clone());
        Ok(())
    }

    async fn get(&self, account_id: &str) -> Result<Option<Profile>, MatchError> {
        Ok(self.profiles.read().await.get(account_id).cloned())
    }

    async fn get_many(&self, account_ids: &[String]) -> Result<HashMap<String, Profile>, MatchError> {
        let profiles = self.profiles.read().await;
        Ok(account_ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }

    async fn delete(&self, account_id: &str) -> Result<(), MatchError> {
        self.profiles.write().await.remove(account_id);
        Ok(())
    }

    async fn count(&self) -> Result<usize, MatchError> {
        Ok(self.profiles.read().await.len())
    }

    async fn skill_frequencies(&self) -> Result<SkillFrequencies, MatchError> {
        let profiles = self.profiles.read().await;
        let mut counts: HashMap<String, (String, usize)> = HashMap::new();
        let mut with_skills = 0;
        for profile in profiles.values().filter(|p| !p.skills.is_empty()) {
            with_skills += 1;
            for skill in &profile.skills {
                counts
                    .entry(skill.normalized_name())
                    .or_insert_with(|| (skill.name.clone(), 0))
                    .1 += 1;
            }
        }
        Ok(SkillFrequencies {
            profiles: with_skills,
            counts: counts.into_values().collect(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: &str, summary: &str) -> Profile {
        Profile {
            account_id: id.into(),
            display_name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            phone: String::new(),
            summary: summary.into(),
            skills: vec![],
            certifications: vec![],
            experience: vec![],
            education: vec![],
            experience_years: None,
            embedding: vec![1.0],
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_put_replaces_wholesale() {
        let store = MemoryProfileStore::new();
        store.put(&profile("a", "first")).await.unwrap();
        store.put(&profile("a", "second")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("a").await.unwrap().unwrap().summary, "second");
    }

    #[tokio::test]
    async fn test_get_many_skips_missing() {
        let store = MemoryProfileStore::new();
        store.put(&profile("a", "x")).await.unwrap();
        let found = store
            .get_many(&["a".to_string(), "zzz".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("a"));
    }

    #[tokio::test]
    async fn test_skill_frequencies_group_by_name() {
        use crate::models::profile::Skill;

        let store = MemoryProfileStore::new();
        let mut a = profile("a", "x");
        a.skills = vec![Skill::named("Python"), Skill::named("AWS")];
        let mut b = profile("b", "y");
        b.skills = vec![Skill::named("python")];
        store.put(&a).await.unwrap();
        store.put(&b).await.unwrap();
        store.put(&profile("c", "no skills")).await.unwrap();

        let freq = store.skill_frequencies().await.unwrap();
        assert_eq!(freq.profiles, 2);
        let mut counts: Vec<(String, usize)> = freq
            .counts
            .into_iter()
            .map(|(name, n)| (name.to_lowercase(), n))
            .collect();
        counts.sort();
        assert_eq!(counts, vec![("aws".to_string(), 1), ("python".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryProfileStore::new();
        store.put(&profile("a", "x")).await.unwrap();
        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
    }
}
