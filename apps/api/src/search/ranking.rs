//! Ranking Engine: hybrid score over vector similarity and required-skill overlap.
//!
//! ```text
//! similarity = (cosine + 1) / 2
//! score      = w_sim * similarity + w_skill * overlap     (required terms present)
//!            = similarity                                 (no required terms)
//! score     -= experience_penalty                         (known years below the hint)
//! ```
//!
//! Zero-overlap candidates are penalised by the weighting, never dropped.

use std::collections::HashMap;

use crate::config::MatchingConfig;
use crate::index::IndexHit;
use crate::models::profile::Profile;
use crate::models::search::{SearchResult, SkillMatch};
use crate::search::intent::QueryIntent;

/// Maps raw cosine from [-1, 1] onto [0, 1].
pub fn rescale_similarity(cosine: f64) -> f64 {
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Per-term match against a profile's skills (case-insensitive substring).
pub fn skill_matches(terms: &[String], profile: &Profile) -> Vec<SkillMatch> {
    let skills: Vec<String> = profile.skills.iter().map(|s| s.name.to_lowercase()).collect();
    terms
        .iter()
        .map(|term| {
            let needle = term.to_lowercase();
            SkillMatch {
                term: term.clone(),
                matched: skills.iter().any(|s| s.contains(&needle)),
            }
        })
        .collect()
}

pub fn final_score(
    similarity: f64,
    matches: &[SkillMatch],
    profile: &Profile,
    intent: &QueryIntent,
    cfg: &MatchingConfig,
) -> f64 {
    let mut score = if matches.is_empty() {
        similarity
    } else {
        let overlap = matches.iter().filter(|m| m.matched).count() as f64 / matches.len() as f64;
        let total = cfg.similarity_weight + cfg.skill_weight;
        (cfg.similarity_weight * similarity + cfg.skill_weight * overlap) / total
    };

    if let (Some(min), Some(years)) = (intent.min_years, profile.experience_years) {
        if years < min {
            score -= cfg.experience_penalty;
        }
    }

    score.clamp(0.0, 1.0)
}

/// Scores `hits` (in index order) and returns the best `limit`.
///
/// Hits whose profile is missing or not indexable are skipped: the index may briefly
/// hold an entry for a profile that was just deleted.
pub fn rank(
    intent: &QueryIntent,
    hits: &[IndexHit],
    profiles: &HashMap<String, Profile>,
    cfg: &MatchingConfig,
    limit: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = hits
        .iter()
        .filter_map(|hit| {
            let profile = profiles.get(&hit.account_id).filter(|p| p.is_indexable())?;
            let similarity = rescale_similarity(hit.similarity);
            let matches = skill_matches(&intent.required_skills, profile);
            let score = final_score(similarity, &matches, profile, intent, cfg);
            Some(SearchResult {
                account_id: profile.account_id.clone(),
                display_name: profile.display_name.clone(),
                email: profile.email.clone(),
                summary: profile.summary.clone(),
                skills: profile.skills.clone(),
                score,
                similarity,
                skill_matches: matches,
            })
        })
        .collect();

    // Stable: equal scores keep index order.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::profile::Skill;
    use crate::profile::vocabulary::SkillVocabulary;
    use crate::search::intent::parse_intent;

    fn profile(id: &str, skills: &[&str], years: Option<u32>) -> Profile {
        Profile {
            account_id: id.into(),
            display_name: id.into(),
            email: String::new(),
            phone: String::new(),
            summary: format!("{id} summary"),
            skills: skills.iter().map(|s| Skill::named(*s)).collect(),
            certifications: vec![],
            experience: vec![],
            education: vec![],
            experience_years: years,
            embedding: vec![1.0],
            updated_at: Utc::now(),
        }
    }

    fn hit(id: &str, similarity: f64) -> IndexHit {
        IndexHit {
            profile_id: id.into(),
            account_id: id.into(),
            similarity,
        }
    }

    fn intent(msg: &str) -> QueryIntent {
        parse_intent(msg, SkillVocabulary::standard())
    }

    fn by_id(profiles: Vec<Profile>) -> HashMap<String, Profile> {
        profiles.into_iter().map(|p| (p.account_id.clone(), p)).collect()
    }

    #[test]
    fn test_rescale_bounds() {
        assert_eq!(rescale_similarity(-1.0), 0.0);
        assert_eq!(rescale_similarity(1.0), 1.0);
        assert_eq!(rescale_similarity(0.0), 0.5);
    }

    #[test]
    fn test_similarity_alone_without_terms() {
        let cfg = MatchingConfig::default();
        let profiles = by_id(vec![profile("a", &["Python"], None), profile("b", &[], None)]);
        let results = rank(
            &intent("someone friendly"),
            &[hit("b", 0.8), hit("a", 0.2)],
            &profiles,
            &cfg,
            10,
        );
        assert_eq!(results[0].account_id, "b");
        assert!((results[0].score - 0.9).abs() < 1e-9);
        assert!(results[0].skill_matches.is_empty());
    }

    #[test]
    fn test_skill_overlap_moves_ranking() {
        let cfg = MatchingConfig::default();
        let profiles = by_id(vec![
            profile("a", &["Python", "AWS"], None),
            profile("b", &["Java"], None),
        ]);
        // b is slightly closer in vector space, a has both required skills.
        let results = rank(
            &intent("Python developer with AWS experience"),
            &[hit("b", 0.30), hit("a", 0.25)],
            &profiles,
            &cfg,
            10,
        );
        assert_eq!(results[0].account_id, "a");
        assert!(results[0].score > results[1].score);
        assert!(results[0].skill_matches.iter().all(|m| m.matched));
        assert!(results[1].skill_matches.iter().all(|m| !m.matched));
    }

    #[test]
    fn test_adding_possessed_term_never_lowers_score() {
        let cfg = MatchingConfig::default();
        let p = profile("a", &["Python", "AWS"], None);
        let none = intent("backend developer");
        let one = intent("backend developer Python");
        let two = intent("backend developer Python Java");
        let three = intent("backend developer Python Java AWS");

        for sim in [0.0, 0.3, 0.7, 1.0] {
            let score = |i: &QueryIntent| {
                let m = skill_matches(&i.required_skills, &p);
                final_score(sim, &m, &p, i, &cfg)
            };
            assert!(score(&one) >= score(&none), "sim={sim}");
            assert!(score(&three) >= score(&two), "sim={sim}");
        }
    }

    #[test]
    fn test_experience_penalty_applies_only_when_known_and_below() {
        let cfg = MatchingConfig::default();
        let i = intent("engineer with 5 years");
        let junior = profile("j", &[], Some(2));
        let unknown = profile("u", &[], None);
        let senior = profile("s", &[], Some(7));
        assert!((final_score(0.8, &[], &junior, &i, &cfg) - 0.7).abs() < 1e-9);
        assert!((final_score(0.8, &[], &unknown, &i, &cfg) - 0.8).abs() < 1e-9);
        assert!((final_score(0.8, &[], &senior, &i, &cfg) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_stable_ties_and_truncation() {
        let cfg = MatchingConfig::default();
        let profiles = by_id(vec![
            profile("x", &[], None),
            profile("y", &[], None),
            profile("z", &[], None),
        ]);
        let hits = [hit("y", 0.5), hit("x", 0.5), hit("z", 0.5)];
        let results = rank(&intent("anyone"), &hits, &profiles, &cfg, 2);
        let ids: Vec<_> = results.iter().map(|r| r.account_id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x"]);
    }

    #[test]
    fn test_missing_or_unindexed_profiles_skipped() {
        let cfg = MatchingConfig::default();
        let mut unindexed = profile("u", &[], None);
        unindexed.embedding.clear();
        let profiles = by_id(vec![profile("a", &[], None), unindexed]);
        let results = rank(
            &intent("anyone"),
            &[hit("ghost", 0.9), hit("u", 0.8), hit("a", 0.1)],
            &profiles,
            &cfg,
            10,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].account_id, "a");
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let p = profile("a", &["PostgreSQL", "Amazon AWS"], None);
        let m = skill_matches(&["postgres".to_string(), "aws".to_string(), "Go".to_string()], &p);
        assert_eq!(
            m.iter().map(|m| m.matched).collect::<Vec<_>>(),
            vec![true, true, false]
        );
    }
}
