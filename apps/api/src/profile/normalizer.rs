//! Profile Normalizer: turns raw resume text, GitHub activity and free-text notes into the
//! canonical structured pieces of a profile (skills, certifications, experience, education).
//!
//! Pure and synchronous. Summary synthesis lives in `profile::summary`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::MatchError;
use crate::models::profile::{normalize_name, Certification, GithubActivity, Skill, SkillLevel};
use crate::profile::certifications::extract_certifications;
use crate::profile::vocabulary::{tokenize, SkillVocabulary};

const LEVEL_WINDOW_BYTES: usize = 100;
const MAX_EXPERIENCE_SNIPPETS: usize = 25;

static OVERALL_YEARS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d{1,2})\+?\s*years?\s+(?:of\s+)?(?:professional\s+|industry\s+)?experience",
        r"(?i)experience\s*:?\s*(\d{1,2})\+?\s*years?",
        r"(?i)(\d{1,2})\+?\s*years?\s+in\s+\w+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid experience regex"))
    .collect()
});

/// "5 years of Python", "3+ yrs experience with Docker", anchored at the skill mention.
static YEARS_BEFORE_SKILL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})\+?\s*(?:years?|yrs?)(?:\s+of)?(?:\s+(?:professional|hands-on))?(?:\s+experience)?(?:\s+(?:with|in|using))?\s*$")
        .expect("valid years-before regex")
});

/// "Python (5 years)"
static YEARS_AFTER_SKILL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\(\s*(\d{1,2})\+?\s*(?:years?|yrs?)").expect("valid years-after regex")
});

static EDUCATION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bbachelor(?:'s)?\s+of\s+\w+",
        r"(?i)\bmaster(?:'s)?\s+of\s+\w+",
        r"(?i)\bph\.?\s?d\.?\s+in\s+\w+",
        r"(?i)\bb\.?\s?tech\.?\s+in\s+\w+",
        r"(?i)\bm\.?\s?tech\.?\s+in\s+\w+",
        r"(?i)\bmba\s+in\s+\w+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid education regex"))
    .collect()
});

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:19|20)\d{2}\s*(?:-|–|—|to)\s*(?:(?:19|20)\d{2}|present|current|now)\b")
        .expect("valid date-range regex")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

static PHONE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:\+\d{1,3}[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
        r"\b\d{10}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid phone regex"))
    .collect()
});

/// Where a piece of the working document came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Resume,
    Github,
    Manual,
}

/// Raw inputs for one account. Any subset may be empty, but not all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSources {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub github: Option<GithubActivity>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// The concatenated, provenance-tagged input text.
#[derive(Debug, Clone, Default)]
pub struct WorkingDocument {
    pub sections: Vec<(Provenance, String)>,
}

impl WorkingDocument {
    pub fn from_sources(sources: &ProfileSources) -> Self {
        let mut sections = Vec::new();
        if let Some(text) = non_blank(sources.resume_text.as_deref()) {
            sections.push((Provenance::Resume, text.to_string()));
        }
        if let Some(gh) = sources.github.as_ref().filter(|g| !g.is_empty()) {
            sections.push((Provenance::Github, gh.to_text()));
        }
        if let Some(text) = non_blank(sources.additional_info.as_deref()) {
            sections.push((Provenance::Manual, text.to_string()));
        }
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Free text written by or about the candidate (resume and manual notes).
    pub fn narrative(&self) -> impl Iterator<Item = (Provenance, &str)> {
        self.sections
            .iter()
            .filter(|(p, _)| *p != Provenance::Github)
            .map(|(p, t)| (*p, t.as_str()))
    }
}

/// Structured output of normalization, before summary synthesis and embedding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedProfile {
    pub skills: Vec<Skill>,
    pub certifications: Vec<Certification>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub experience_years: Option<u32>,
    /// First email address found in the resume or notes.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub github_languages: Vec<String>,
    pub github_username: Option<String>,
    /// Plain-text rendering of the GitHub activity, empty when there was none.
    pub github_text: String,
    /// Whitespace-collapsed narrative text, used when nothing structured was found.
    pub fallback_text: String,
}

/// Normalizes raw sources into structured profile pieces.
///
/// Fails with `InsufficientInput` when every source is empty. Everything else is
/// best-effort and degrades to empty lists.
pub fn normalize(
    sources: &ProfileSources,
    vocab: &SkillVocabulary,
) -> Result<NormalizedProfile, MatchError> {
    let doc = WorkingDocument::from_sources(sources);
    if doc.is_empty() {
        return Err(MatchError::InsufficientInput);
    }

    let mut skills: Vec<Skill> = Vec::new();

    for (_, text) in doc.narrative().filter(|(p, _)| *p == Provenance::Resume) {
        for skill in skills_from_text(text, vocab) {
            merge_skill(&mut skills, skill);
        }
    }

    let github = sources.github.as_ref().filter(|g| !g.is_empty());
    let mut github_languages = Vec::new();
    if let Some(gh) = github {
        for lang in gh.ranked_languages() {
            let name = vocab.canonicalize(lang).map(str::to_string).unwrap_or_else(|| lang.trim().to_string());
            github_languages.push(name.clone());
            merge_skill(&mut skills, Skill::named(name));
        }
        for topic in &gh.topics {
            let Some(name) = vocab
                .canonicalize(topic)
                .map(str::to_string)
                .or_else(|| non_blank(Some(topic.as_str())).map(|t| t.trim().to_string()))
            else {
                continue;
            };
            merge_skill(&mut skills, Skill::named(name));
        }
    }

    for (_, text) in doc.narrative().filter(|(p, _)| *p == Provenance::Manual) {
        for skill in skills_from_text(text, vocab) {
            merge_skill(&mut skills, skill);
        }
    }

    let mut certifications: Vec<Certification> = Vec::new();
    let mut experience: Vec<String> = Vec::new();
    let mut education: Vec<String> = Vec::new();
    let mut experience_years = None;
    let mut email = None;
    let mut phone = None;
    let mut fallback = Vec::new();

    for (_, text) in doc.narrative() {
        for cert in extract_certifications(text) {
            if !certifications
                .iter()
                .any(|c| c.normalized_name() == cert.normalized_name())
            {
                certifications.push(cert);
            }
        }
        for snippet in experience_snippets(text) {
            if experience.len() < MAX_EXPERIENCE_SNIPPETS && !experience.contains(&snippet) {
                experience.push(snippet);
            }
        }
        for degree in education_lines(text) {
            if !education.iter().any(|e| normalize_name(e) == normalize_name(&degree)) {
                education.push(degree);
            }
        }
        experience_years = experience_years.or_else(|| overall_years(text));
        email = email.or_else(|| EMAIL.find(text).map(|m| m.as_str().to_string()));
        phone = phone.or_else(|| contact_phone(text));
        fallback.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    Ok(NormalizedProfile {
        skills,
        certifications,
        experience,
        education,
        experience_years,
        email,
        phone,
        github_languages,
        github_username: github.and_then(|g| g.username.clone()),
        github_text: github.map(GithubActivity::to_text).unwrap_or_default(),
        fallback_text: fallback.join(" "),
    })
}

/// Vocabulary skills in a narrative text, with level and years hints from nearby words.
fn skills_from_text(text: &str, vocab: &SkillVocabulary) -> Vec<Skill> {
    vocab
        .find_mentions(text)
        .into_iter()
        .map(|m| Skill {
            name: m.canonical.to_string(),
            level: Some(level_hint(text, &m.span)),
            years: years_hint(text, &m.span),
        })
        .collect()
}

/// Adds a skill unless one with the same normalized name exists; fills missing hints.
fn merge_skill(skills: &mut Vec<Skill>, skill: Skill) {
    let key = skill.normalized_name();
    if key.is_empty() {
        return;
    }
    match skills.iter_mut().find(|s| s.normalized_name() == key) {
        Some(existing) => {
            existing.level = existing.level.or(skill.level);
            existing.years = existing.years.or(skill.years);
        }
        None => skills.push(skill),
    }
}

fn level_hint(text: &str, span: &Range<usize>) -> SkillLevel {
    let (start, end) = window_bounds(text, span, LEVEL_WINDOW_BYTES, LEVEL_WINDOW_BYTES);
    let window: Vec<String> = tokenize(&text[start..end]).into_iter().map(|t| t.lower).collect();
    let has = |words: &[&str]| window.iter().any(|w| words.contains(&w.as_str()));

    if has(&["expert", "advanced", "senior", "lead"]) {
        SkillLevel::Expert
    } else if has(&["proficient", "experienced", "intermediate"]) {
        SkillLevel::Advanced
    } else if has(&["familiar", "basic", "beginner"]) {
        SkillLevel::Beginner
    } else {
        SkillLevel::Intermediate
    }
}

fn years_hint(text: &str, span: &Range<usize>) -> Option<u32> {
    let (start, end) = window_bounds(text, span, 48, 16);

    YEARS_BEFORE_SKILL
        .captures(&text[start..span.start])
        .or_else(|| YEARS_AFTER_SKILL.captures(&text[span.end..end]))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Byte window around `span`, widened outwards to char boundaries.
fn window_bounds(text: &str, span: &Range<usize>, before: usize, after: usize) -> (usize, usize) {
    let mut start = span.start.saturating_sub(before);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (span.end + after).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    (start, end)
}

fn overall_years(text: &str) -> Option<u32> {
    OVERALL_YEARS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn contact_phone(text: &str) -> Option<String> {
    PHONE
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim().to_string())
}

fn education_lines(text: &str) -> Vec<String> {
    EDUCATION
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Bullet lines and lines carrying a date range ("2019 - Present").
fn experience_snippets(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let bullet = trimmed.strip_prefix(['-', '*', '•', '·', '▪']);
            if bullet.is_none() && !DATE_RANGE.is_match(trimmed) {
                return None;
            }
            let body = bullet.unwrap_or(trimmed);
            let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
            (body.split(' ').count() >= 3).then_some(body)
        })
        .collect()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "\
Jane Doe - Senior Backend Engineer
Expert in Python and AWS; familiar with Docker.
8+ years of experience building distributed systems.
Acme Corp, 2019 - Present
- Built event pipelines on Kubernetes processing 2M events per day
- Led migration from MySQL to PostgreSQL
AWS Certified Solutions Architect - Associate (2021)
Bachelor of Science, State University";

    fn sources(resume: Option<&str>, gh: Option<GithubActivity>, info: Option<&str>) -> ProfileSources {
        ProfileSources {
            resume_text: resume.map(str::to_string),
            github: gh,
            additional_info: info.map(str::to_string),
        }
    }

    fn skill_names(p: &NormalizedProfile) -> Vec<&str> {
        p.skills.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_all_empty_inputs_rejected() {
        let vocab = SkillVocabulary::standard();
        let err = normalize(&sources(None, None, None), vocab).unwrap_err();
        assert_eq!(err, MatchError::InsufficientInput);

        let err = normalize(
            &sources(Some("   \n"), Some(GithubActivity::default()), Some("")),
            vocab,
        )
        .unwrap_err();
        assert_eq!(err, MatchError::InsufficientInput);
    }

    #[test]
    fn test_resume_extraction() {
        let p = normalize(&sources(Some(RESUME), None, None), SkillVocabulary::standard()).unwrap();

        assert_eq!(
            skill_names(&p),
            vec!["Python", "AWS", "Docker", "Kubernetes", "MySQL", "PostgreSQL"]
        );
        assert_eq!(p.experience_years, Some(8));
        assert_eq!(p.certifications.len(), 1);
        assert_eq!(p.certifications[0].name, "AWS Certified Solutions Architect - Associate");
        assert_eq!(p.education, vec!["Bachelor of Science"]);
        assert!(p.experience.contains(&"Acme Corp, 2019 - Present".to_string()));
        assert!(p
            .experience
            .contains(&"Led migration from MySQL to PostgreSQL".to_string()));
    }

    #[test]
    fn test_contact_details_extracted() {
        let text = "Jane Doe\njane.doe@example.org | +1 (555) 123-4567\nPython developer since 2015 - 2020";
        let p = normalize(&sources(Some(text), None, None), SkillVocabulary::standard()).unwrap();
        assert_eq!(p.email.as_deref(), Some("jane.doe@example.org"));
        assert_eq!(p.phone.as_deref(), Some("+1 (555) 123-4567"));

        let p = normalize(&sources(None, None, Some("Call 5551234567 anytime")), SkillVocabulary::standard())
            .unwrap();
        assert_eq!(p.email, None);
        assert_eq!(p.phone.as_deref(), Some("5551234567"));

        let p = normalize(&sources(Some(RESUME), None, None), SkillVocabulary::standard()).unwrap();
        assert_eq!(p.phone, None);
    }

    #[test]
    fn test_level_hints_from_context() {
        let p = normalize(
            &sources(Some("Basic knowledge of Ruby."), None, None),
            SkillVocabulary::standard(),
        )
        .unwrap();
        assert_eq!(p.skills[0].level, Some(SkillLevel::Beginner));

        let p = normalize(
            &sources(Some("Ships Ruby code daily."), None, None),
            SkillVocabulary::standard(),
        )
        .unwrap();
        assert_eq!(p.skills[0].level, Some(SkillLevel::Intermediate));
    }

    #[test]
    fn test_years_hint_per_skill() {
        let p = normalize(
            &sources(Some("5 years of Java. Scala (2 yrs)."), None, None),
            SkillVocabulary::standard(),
        )
        .unwrap();
        assert_eq!(p.skills[0].name, "Java");
        assert_eq!(p.skills[0].years, Some(5));
        assert_eq!(p.skills[1].name, "Scala");
        assert_eq!(p.skills[1].years, Some(2));
    }

    #[test]
    fn test_github_languages_and_topics_are_explicit_skills() {
        let gh = GithubActivity {
            username: Some("octo".into()),
            languages: vec![("HCL".into(), 50), ("python".into(), 5000)],
            topics: vec!["machine-learning".into(), "".into()],
            ..Default::default()
        };
        let p = normalize(&sources(None, Some(gh), None), SkillVocabulary::standard()).unwrap();
        assert_eq!(skill_names(&p), vec!["Python", "HCL", "Machine Learning"]);
        assert_eq!(p.github_languages, vec!["Python", "HCL"]);
        assert_eq!(p.github_username.as_deref(), Some("octo"));
        assert!(p.skills.iter().all(|s| s.level.is_none()));
    }

    #[test]
    fn test_dedup_across_sources_fills_hints() {
        let gh = GithubActivity {
            languages: vec![("Rust".into(), 10)],
            ..Default::default()
        };
        let p = normalize(
            &sources(None, Some(gh), Some("Rust for 4 years of rust in production")),
            SkillVocabulary::standard(),
        )
        .unwrap();
        assert_eq!(skill_names(&p), vec!["Rust"]);
        assert!(p.skills[0].level.is_some());
    }

    #[test]
    fn test_manual_only_profile_keeps_fallback_text() {
        let p = normalize(
            &sources(None, None, Some("Enjoys   mentoring\njunior colleagues")),
            SkillVocabulary::standard(),
        )
        .unwrap();
        assert!(p.skills.is_empty());
        assert_eq!(p.fallback_text, "Enjoys mentoring junior colleagues");
    }

    #[test]
    fn test_working_document_tags_provenance() {
        let gh = GithubActivity {
            username: Some("octo".into()),
            ..Default::default()
        };
        let doc = WorkingDocument::from_sources(&sources(Some("resume"), Some(gh), Some("notes")));
        let tags: Vec<_> = doc.sections.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            tags,
            vec![Provenance::Resume, Provenance::Github, Provenance::Manual]
        );
        assert_eq!(doc.narrative().count(), 2);
    }
}
