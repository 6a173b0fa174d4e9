//! Skill distribution across stored profiles.

use serde::Serialize;

use crate::errors::MatchError;
use crate::profile::vocabulary::{SkillCategory, SkillVocabulary};
use crate::store::{ProfileStore, SkillFrequencies};

pub const TOP_SKILLS: usize = 20;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkillStat {
    pub skill: String,
    /// `None` for skills outside the vocabulary (e.g. GitHub topics).
    pub category: Option<SkillCategory>,
    pub count: usize,
    /// Share of profiles with any skill, in percent, two decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkillAnalytics {
    pub profiles_with_skills: usize,
    pub top_skills: Vec<SkillStat>,
}

pub async fn skill_analytics(
    store: &dyn ProfileStore,
    vocab: &SkillVocabulary,
    top: usize,
) -> Result<SkillAnalytics, MatchError> {
    let frequencies = store.skill_frequencies().await?;
    Ok(summarize(frequencies, vocab, top))
}

/// Most common skills first; equal counts are ordered by name.
fn summarize(frequencies: SkillFrequencies, vocab: &SkillVocabulary, top: usize) -> SkillAnalytics {
    let SkillFrequencies { profiles, mut counts } = frequencies;
    counts.sort_by(|(a_name, a), (b_name, b)| {
        b.cmp(a)
            .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
    });

    let top_skills = counts
        .into_iter()
        .take(top)
        .map(|(skill, count)| SkillStat {
            category: vocab.category(&skill),
            percentage: percentage(count, profiles),
            skill,
            count,
        })
        .collect();

    SkillAnalytics {
        profiles_with_skills: profiles,
        top_skills,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 10_000.0 / total as f64).round() / 100.0
}
