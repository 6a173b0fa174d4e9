use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proficiency hint attached to an extracted skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    pub level: Option<SkillLevel>,
    pub years: Option<u32>,
}

impl Skill {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            years: None,
        }
    }

    /// Key used for per-profile uniqueness and case-insensitive matching.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
    pub issued_year: Option<i32>,
}

impl Certification {
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Lowercased, whitespace-collapsed form of a skill or certification name.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Structured activity hints produced by the GitHub fetcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GithubActivity {
    #[serde(default)]
    pub username: Option<String>,
    /// (language, bytes of code) pairs.
    #[serde(default)]
    pub languages: Vec<(String, u64)>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub contributions: Option<u32>,
}

impl GithubActivity {
    pub fn is_empty(&self) -> bool {
        self.username.as_deref().map_or(true, |u| u.trim().is_empty())
            && self.languages.is_empty()
            && self.repositories.is_empty()
            && self.topics.is_empty()
    }

    /// Languages ordered by bytes of code, largest first. Ties keep input order.
    pub fn ranked_languages(&self) -> Vec<&str> {
        let mut langs: Vec<&(String, u64)> = self.languages.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(&a.1));
        langs.into_iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Plain-text rendering used as the GitHub section of the working document.
    pub fn to_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(user) = self.username.as_deref().filter(|u| !u.trim().is_empty()) {
            parts.push(format!("GitHub user {user}."));
        }
        let langs = self.ranked_languages();
        if !langs.is_empty() {
            parts.push(format!("Languages: {}.", langs.join(", ")));
        }
        if !self.topics.is_empty() {
            parts.push(format!("Topics: {}.", self.topics.join(", ")));
        }
        if !self.repositories.is_empty() {
            parts.push(format!("Repositories: {}.", self.repositories.join(", ")));
        }
        if let Some(c) = self.contributions {
            parts.push(format!("{c} contributions."));
        }
        parts.join(" ")
    }
}

/// Canonical candidate profile. One per account; replaced wholesale on every upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub account_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub summary: String,
    pub skills: Vec<Skill>,
    pub certifications: Vec<Certification>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub experience_years: Option<u32>,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub embedding: Vec<f32>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A profile without a computed embedding must never be searchable.
    pub fn is_indexable(&self) -> bool {
        !self.summary.trim().is_empty() && !self.embedding.is_empty()
    }
}
