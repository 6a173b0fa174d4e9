use serde::{Deserialize, Serialize};

use crate::models::profile::Skill;

/// Whether a single required term was found in a candidate's skill set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillMatch {
    pub term: String,
    pub matched: bool,
}

/// One ranked candidate. Only the ordering of a result list is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub account_id: String,
    pub display_name: String,
    pub email: String,
    pub summary: String,
    pub skills: Vec<Skill>,
    /// Final bounded score in [0, 1].
    pub score: f64,
    /// Vector similarity rescaled to [0, 1], before skill weighting.
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skill_matches: Vec<SkillMatch>,
}
