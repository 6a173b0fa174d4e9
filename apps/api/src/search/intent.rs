//! Query understanding: free-text recruiter message → [`QueryIntent`].

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::profile::vocabulary::{tokenize, SkillVocabulary};

static YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:-\s*)?(?:years?|yrs?)\b(?:\s+of\s+experience)?")
        .expect("valid years regex")
});

static LIMIT_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\btop\s+(\d{1,3})\b|\b(\d{1,3})\s+(?:candidates?|people|profiles?|engineers?|developers?)\b",
    )
    .expect("valid limit regex")
});

/// Words that signal the message is asking for candidates.
const SEARCH_CUES: &[&str] = &[
    "find", "search", "looking", "look", "need", "needs", "hire", "hiring", "who", "show",
    "recommend", "suggest", "candidate", "candidates", "developer", "developers", "engineer",
    "engineers", "profile", "profiles", "people", "someone", "anyone", "expert", "experts",
    "list", "match", "matches",
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl Seniority {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "junior" | "jr" | "entry" | "graduate" => Some(Seniority::Junior),
            "mid" | "intermediate" => Some(Seniority::Mid),
            "senior" | "sr" => Some(Seniority::Senior),
            "lead" | "principal" | "staff" => Some(Seniority::Lead),
            _ => None,
        }
    }

    /// Minimum years of experience this level implies, if any.
    pub fn implied_years(self) -> Option<u32> {
        match self {
            Seniority::Junior => None,
            Seniority::Mid => Some(3),
            Seniority::Senior => Some(5),
            Seniority::Lead => Some(8),
        }
    }
}

/// Structured interpretation of a recruiter request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryIntent {
    /// Canonical vocabulary skills named in the message, in mention order.
    pub required_skills: Vec<String>,
    /// Explicit "N years" threshold, or the one implied by `seniority`.
    pub min_years: Option<u32>,
    pub seniority: Option<Seniority>,
    /// "top 3", "5 candidates"
    pub limit_hint: Option<usize>,
    /// Text sent to the embedder. Never empty for a non-blank message.
    pub query_text: String,
    #[serde(skip)]
    has_search_cue: bool,
}

impl QueryIntent {
    /// True when the message names a skill, an experience hint or a search cue.
    pub fn is_search(&self) -> bool {
        self.has_search_cue
            || !self.required_skills.is_empty()
            || self.min_years.is_some()
            || self.seniority.is_some()
    }

    /// Intent for a structured job requirement: listed skills, a free-text description
    /// and an experience level such as "Senior" or "5+ years".
    ///
    /// Known skills are canonicalised, unknown ones kept as written. Always a search.
    pub fn from_requirements(
        skills: &[String],
        description: &str,
        experience_level: &str,
        vocab: &SkillVocabulary,
    ) -> Self {
        let mut required_skills: Vec<String> = Vec::new();
        for skill in skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let name = vocab.canonicalize(skill).unwrap_or(skill);
            if !required_skills.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                required_skills.push(name.to_string());
            }
        }

        let seniority = tokenize(experience_level)
            .iter()
            .find_map(|t| Seniority::from_word(&t.lower));
        let explicit_years = YEARS
            .captures(experience_level)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        let query_text = [required_skills.join(", "), description.trim().to_string()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(". ");

        QueryIntent {
            required_skills,
            min_years: explicit_years.or_else(|| seniority.and_then(Seniority::implied_years)),
            seniority,
            limit_hint: None,
            query_text,
            has_search_cue: true,
        }
    }
}

pub fn parse_intent(message: &str, vocab: &SkillVocabulary) -> QueryIntent {
    let mut removed: Vec<Range<usize>> = Vec::new();

    let mut required_skills: Vec<String> = Vec::new();
    for mention in vocab.find_mentions(message) {
        if !required_skills.iter().any(|s| s == mention.canonical) {
            required_skills.push(mention.canonical.to_string());
        }
        removed.push(mention.span);
    }

    let mut explicit_years = None;
    if let Some(caps) = YEARS.captures(message) {
        explicit_years = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        if let Some(m) = caps.get(0) {
            removed.push(m.range());
        }
    }

    let mut limit_hint = None;
    if let Some(caps) = LIMIT_HINT.captures(message) {
        limit_hint = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .filter(|n| *n > 0);
        // Keep the noun ("developers") for the embedder; drop only the count.
        if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
            removed.push(m.range());
        }
    }

    let words: Vec<String> = tokenize(message).into_iter().map(|t| t.lower).collect();
    let seniority = words.iter().find_map(|w| Seniority::from_word(w));
    let has_search_cue = words.iter().any(|w| SEARCH_CUES.contains(&w.as_str()));

    QueryIntent {
        required_skills,
        min_years: explicit_years.or_else(|| seniority.and_then(Seniority::implied_years)),
        seniority,
        limit_hint,
        query_text: remaining_text(message, &removed),
        has_search_cue,
    }
}

/// The message with extracted spans cut out, or the whole message when nothing
/// meaningful is left.
fn remaining_text(message: &str, removed: &[Range<usize>]) -> String {
    let mut keep = String::with_capacity(message.len());
    let mut cursor = 0;
    let mut spans = removed.to_vec();
    spans.sort_by_key(|r| r.start);

    for span in spans {
        if span.start > cursor {
            keep.push_str(&message[cursor..span.start]);
        }
        keep.push(' ');
        cursor = cursor.max(span.end);
    }
    if cursor < message.len() {
        keep.push_str(&message[cursor..]);
    }

    let collapsed = keep.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().any(char::is_alphanumeric) {
        collapsed
    } else {
        message.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(msg: &str) -> QueryIntent {
        parse_intent(msg, SkillVocabulary::standard())
    }

    #[test]
    fn test_skills_and_years_extracted() {
        let i = intent("Python developer with AWS and 5+ years of experience");
        assert_eq!(i.required_skills, vec!["Python", "AWS"]);
        assert_eq!(i.min_years, Some(5));
        assert_eq!(i.query_text, "developer with and");
        assert!(i.is_search());
    }

    #[test]
    fn test_only_skills_falls_back_to_full_message() {
        let i = intent("Python, AWS");
        assert_eq!(i.required_skills, vec!["Python", "AWS"]);
        assert_eq!(i.query_text, "Python, AWS");
    }

    #[test]
    fn test_seniority_implies_years() {
        let i = intent("need a senior Go engineer");
        assert_eq!(i.seniority, Some(Seniority::Senior));
        assert_eq!(i.min_years, Some(5));
        assert_eq!(i.required_skills, vec!["Go"]);

        let i = intent("senior engineer with 2 years in Rust");
        assert_eq!(i.min_years, Some(2));
    }

    #[test]
    fn test_limit_hint() {
        assert_eq!(intent("show me the top 3 Rust people").limit_hint, Some(3));
        assert_eq!(intent("find 4 developers who know React").limit_hint, Some(4));
        assert_eq!(intent("find developers").limit_hint, None);
        assert_eq!(intent("top 0 people").limit_hint, None);
    }

    #[test]
    fn test_limit_count_is_removed_but_noun_kept() {
        let i = intent("top 3 engineers");
        assert_eq!(i.query_text, "top engineers");
    }

    #[test]
    fn test_small_talk_is_not_a_search() {
        let i = intent("hello there, thanks!");
        assert!(!i.is_search());
        assert_eq!(i.query_text, "hello there, thanks!");
    }

    #[test]
    fn test_requirements_intent() {
        let skills = vec!["python".to_string(), "k8s".into(), "HCL".into(), "Python3".into(), " ".into()];
        let i = QueryIntent::from_requirements(
            &skills,
            "Platform team building data pipelines",
            "Senior",
            SkillVocabulary::standard(),
        );
        assert_eq!(i.required_skills, vec!["Python", "Kubernetes", "HCL"]);
        assert_eq!(i.seniority, Some(Seniority::Senior));
        assert_eq!(i.min_years, Some(5));
        assert_eq!(i.limit_hint, None);
        assert_eq!(i.query_text, "Python, Kubernetes, HCL. Platform team building data pipelines");
        assert!(i.is_search());
    }

    #[test]
    fn test_requirements_explicit_years_win() {
        let i = QueryIntent::from_requirements(
            &["Rust".to_string()],
            "",
            "Lead, 3+ years",
            SkillVocabulary::standard(),
        );
        assert_eq!(i.seniority, Some(Seniority::Lead));
        assert_eq!(i.min_years, Some(3));
        assert_eq!(i.query_text, "Rust");
    }

    #[test]
    fn test_duplicate_skill_mentions_collapse() {
        let i = intent("python or Python3 people");
        assert_eq!(i.required_skills, vec!["Python"]);
    }
}
