//! Summary synthesis: the canonical text that is displayed, embedded and searched.
//!
//! The deterministic summary always names every extracted skill and certification. When a
//! text generator is configured it may rephrase those facts; anything the rephrased text
//! drops is appended back so keyword recall never depends on the generator.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, PLAIN_TEXT_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::profile::normalizer::NormalizedProfile;
use crate::profile::prompts::SUMMARY_PROMPT_TEMPLATE;
use crate::profile::vocabulary::{contains_phrase, SkillVocabulary};

const TOP_GITHUB_LANGUAGES: usize = 5;
const EXPERIENCE_HIGHLIGHTS: usize = 2;
const MAX_FALLBACK_CHARS: usize = 600;

/// Builds profile summaries, optionally phrased by a text generator.
#[derive(Clone)]
pub struct SummaryComposer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl SummaryComposer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Always returns a non-empty summary. Generator failures fall back to the
    /// deterministic text.
    pub async fn compose(&self, display_name: &str, profile: &NormalizedProfile) -> String {
        let facts = deterministic_summary(display_name, profile);

        let Some(generator) = &self.generator else {
            return facts;
        };

        let prompt = SUMMARY_PROMPT_TEMPLATE
            .replace("{facts}", &facts)
            .replace("{grounding_instruction}", GROUNDING_INSTRUCTION);

        match tokio::time::timeout(self.timeout, generator.generate(PLAIN_TEXT_SYSTEM, &prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!("Summary phrased by generator ({} chars)", text.len());
                ensure_coverage(text.trim(), profile)
            }
            Ok(Ok(_)) => {
                warn!("Generator returned an empty summary, using deterministic text");
                facts
            }
            Ok(Err(e)) => {
                warn!("Summary generation failed, using deterministic text: {e}");
                facts
            }
            Err(_) => {
                warn!("Summary generation timed out after {:?}", self.timeout);
                facts
            }
        }
    }
}

/// Fact sentences covering skills, experience, certifications, education, GitHub
/// languages and the first experience highlights. Never empty.
pub fn deterministic_summary(display_name: &str, profile: &NormalizedProfile) -> String {
    let subject = match display_name.trim() {
        "" => "The candidate",
        name => name,
    };
    let mut sentences = Vec::new();

    if let Some(years) = profile.experience_years {
        sentences.push(format!("{subject} has {years} years of professional experience."));
    }
    if !profile.skills.is_empty() {
        let names: Vec<&str> = profile.skills.iter().map(|s| s.name.as_str()).collect();
        let skills = join_list(&names);
        if sentences.is_empty() {
            sentences.push(format!("{subject} works with {skills}."));
        } else {
            sentences.push(format!("They work with {skills}."));
        }
    }
    if !profile.certifications.is_empty() {
        let names: Vec<&str> = profile.certifications.iter().map(|c| c.name.as_str()).collect();
        sentences.push(format!("Certifications: {}.", join_list(&names)));
    }
    if !profile.education.is_empty() {
        let degrees: Vec<&str> = profile.education.iter().map(String::as_str).collect();
        sentences.push(format!("Education: {}.", join_list(&degrees)));
    }
    if !profile.github_languages.is_empty() {
        let langs: Vec<&str> = profile
            .github_languages
            .iter()
            .take(TOP_GITHUB_LANGUAGES)
            .map(String::as_str)
            .collect();
        sentences.push(format!("Most active GitHub languages: {}.", join_list(&langs)));
    }
    if !profile.experience.is_empty() {
        let highlights: Vec<&str> = profile
            .experience
            .iter()
            .take(EXPERIENCE_HIGHLIGHTS)
            .map(|s| s.trim_end_matches('.'))
            .collect();
        sentences.push(format!("Experience highlights: {}.", highlights.join("; ")));
    }

    if !sentences.is_empty() {
        return sentences.join(" ");
    }

    // Nothing structured was found: fall back to the source text itself.
    let fallback = if !profile.fallback_text.trim().is_empty() {
        truncate_chars(profile.fallback_text.trim(), MAX_FALLBACK_CHARS)
    } else {
        profile.github_text.trim().to_string()
    };
    if fallback.is_empty() {
        format!("{subject} has a candidate profile.")
    } else {
        fallback
    }
}

/// Appends any skill or certification the text does not already mention.
fn ensure_coverage(text: &str, profile: &NormalizedProfile) -> String {
    let vocab = SkillVocabulary::standard();
    let missing_skills: Vec<&str> = profile
        .skills
        .iter()
        .map(|s| s.name.as_str())
        .filter(|name| !vocab.mentions_skill(text, name))
        .collect();
    let missing_certs: Vec<&str> = profile
        .certifications
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| !contains_phrase(text, name))
        .collect();

    let mut out = text.to_string();
    if !missing_skills.is_empty() {
        out.push_str(&format!(" Skills: {}.", join_list(&missing_skills)));
    }
    if !missing_certs.is_empty() {
        out.push_str(&format!(" Certifications: {}.", join_list(&missing_certs)));
    }
    out
}

/// "a", "a and b", "a, b and c"
fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::profile::{Certification, Skill};
    use async_trait::async_trait;

    struct Canned(Result<String, ()>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            self.0.clone().map_err(|_| LlmError::EmptyContent)
        }
    }

    struct Stalls;

    #[async_trait]
    impl TextGenerator for Stalls {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".into())
        }
    }

    fn profile() -> NormalizedProfile {
        NormalizedProfile {
            skills: vec![Skill::named("Python"), Skill::named("AWS"), Skill::named("Go")],
            certifications: vec![Certification {
                name: "AWS Certified Developer".into(),
                issuer: None,
                issued_year: None,
            }],
            experience_years: Some(6),
            github_languages: vec!["Python".into()],
            experience: vec!["Built billing APIs.".into(), "Led a team of 4".into(), "Third".into()],
            ..Default::default()
        }
    }

    fn composer(generator: impl TextGenerator + 'static) -> SummaryComposer {
        SummaryComposer::new(Some(Arc::new(generator)), Duration::from_secs(5))
    }

    #[test]
    fn test_deterministic_summary_contains_every_fact() {
        let text = deterministic_summary("Ada Lovelace", &profile());
        assert_eq!(
            text,
            "Ada Lovelace has 6 years of professional experience. \
             They work with Python, AWS and Go. \
             Certifications: AWS Certified Developer. \
             Most active GitHub languages: Python. \
             Experience highlights: Built billing APIs; Led a team of 4."
        );
    }

    #[test]
    fn test_deterministic_summary_falls_back_to_source_text() {
        let p = NormalizedProfile {
            fallback_text: "Enjoys mentoring".into(),
            ..Default::default()
        };
        assert_eq!(deterministic_summary("", &p), "Enjoys mentoring");

        let p = NormalizedProfile {
            github_text: "GitHub user octo.".into(),
            ..Default::default()
        };
        assert_eq!(deterministic_summary("", &p), "GitHub user octo.");

        assert_eq!(
            deterministic_summary("Bo", &NormalizedProfile::default()),
            "Bo has a candidate profile."
        );
    }

    #[test]
    fn test_join_list() {
        assert_eq!(join_list(&["a"]), "a");
        assert_eq!(join_list(&["a", "b"]), "a and b");
        assert_eq!(join_list(&["a", "b", "c"]), "a, b and c");
    }

    #[tokio::test]
    async fn test_without_generator_uses_deterministic_text() {
        let c = SummaryComposer::new(None, Duration::from_secs(1));
        assert_eq!(c.compose("Ada", &profile()).await, deterministic_summary("Ada", &profile()));
    }

    #[tokio::test]
    async fn test_generated_summary_gets_missing_facts_appended() {
        let c = composer(Canned(Ok("Ada is a seasoned Python engineer who is good at AWS.".into())));
        let text = c.compose("Ada", &profile()).await;
        assert_eq!(
            text,
            "Ada is a seasoned Python engineer who is good at AWS. Skills: Go. \
             Certifications: AWS Certified Developer."
        );
    }

    #[tokio::test]
    async fn test_lowercase_common_word_does_not_cover_skill() {
        let c = composer(Canned(Ok(
            "Ada writes Python on AWS and will go above and beyond. AWS Certified Developer.".into(),
        )));
        let text = c.compose("Ada", &profile()).await;
        assert_eq!(
            text,
            "Ada writes Python on AWS and will go above and beyond. AWS Certified Developer. \
             Skills: Go."
        );
    }

    #[tokio::test]
    async fn test_generator_failure_falls_back() {
        let c = composer(Canned(Err(())));
        assert_eq!(c.compose("Ada", &profile()).await, deterministic_summary("Ada", &profile()));

        let c = composer(Canned(Ok("   ".into())));
        assert_eq!(c.compose("Ada", &profile()).await, deterministic_summary("Ada", &profile()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_timeout_falls_back() {
        let c = SummaryComposer::new(Some(Arc::new(Stalls)), Duration::from_secs(1));
        assert_eq!(c.compose("Ada", &profile()).await, deterministic_summary("Ada", &profile()));
    }
}
