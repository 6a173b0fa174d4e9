//! Chat Orchestrator: recruiter message in, grounded natural-language answer out.
//!
//! Flow: parse intent → (no search intent: guidance) → search → deterministic answer →
//! optional generator rephrase, kept only if it passes the grounding check.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::MatchError;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, PLAIN_TEXT_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::models::search::SearchResult;
use crate::search::grounding::{candidate_label, ungrounded_entities};
use crate::search::intent::{parse_intent, QueryIntent};
use crate::search::prompts::{CHAT_GUIDANCE, CHAT_PROMPT_TEMPLATE};
use crate::search::service::SearchService;

/// Skills listed per named candidate in the deterministic answer.
const SKILLS_PER_CANDIDATE: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub intent: QueryIntent,
    pub results: Vec<SearchResult>,
}

pub struct ChatOrchestrator {
    search: Arc<SearchService>,
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl ChatOrchestrator {
    pub fn new(
        search: Arc<SearchService>,
        generator: Option<Arc<dyn TextGenerator>>,
        timeout: Duration,
    ) -> Self {
        Self {
            search,
            generator,
            timeout,
        }
    }

    pub async fn respond(&self, message: &str) -> Result<ChatReply, MatchError> {
        if message.trim().is_empty() {
            return Err(MatchError::EmptyInput);
        }

        let intent = parse_intent(message, self.search.vocabulary());
        if !intent.is_search() {
            return Ok(ChatReply {
                response: CHAT_GUIDANCE.to_string(),
                intent,
                results: Vec::new(),
            });
        }

        let cfg = self.search.config();
        let limit = intent
            .limit_hint
            .unwrap_or(cfg.chat_limit)
            .clamp(1, cfg.max_limit);

        // Never answer with a partial or invented list when retrieval breaks.
        let results = self
            .search
            .run(&intent, limit)
            .await
            .map_err(|e| match e {
                MatchError::RetrievalFailed(_) => e,
                other => MatchError::RetrievalFailed(other.to_string()),
            })?;

        let draft = deterministic_response(&intent, &results, cfg.chat_mentions);
        let response = match (&self.generator, results.is_empty()) {
            (Some(generator), false) => {
                self.rephrase(generator.as_ref(), message, &draft, &results, cfg.chat_mentions)
                    .await
            }
            _ => draft,
        };

        info!(results = results.len(), "Chat answered");
        Ok(ChatReply {
            response,
            intent,
            results,
        })
    }

    async fn rephrase(
        &self,
        generator: &dyn TextGenerator,
        message: &str,
        draft: &str,
        results: &[SearchResult],
        mentions: usize,
    ) -> String {
        let candidates = results
            .iter()
            .take(mentions)
            .map(|r| {
                let skills: Vec<&str> = r.skills.iter().map(|s| s.name.as_str()).collect();
                format!("- {}: {}", candidate_label(r), skills.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = CHAT_PROMPT_TEMPLATE
            .replace("{message}", message)
            .replace("{candidates}", &candidates)
            .replace("{draft}", draft)
            .replace("{grounding_instruction}", GROUNDING_INSTRUCTION);

        let text = match tokio::time::timeout(self.timeout, generator.generate(PLAIN_TEXT_SYSTEM, &prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => return draft.to_string(),
            Ok(Err(e)) => {
                warn!("Chat phrasing failed, using deterministic answer: {e}");
                return draft.to_string();
            }
            Err(_) => {
                warn!("Chat phrasing timed out after {:?}", self.timeout);
                return draft.to_string();
            }
        };

        let problems = ungrounded_entities(&text, results, self.search.vocabulary());
        if problems.is_empty() {
            text
        } else {
            warn!(?problems, "Discarding ungrounded chat phrasing");
            draft.to_string()
        }
    }
}

/// Count plus the top candidates with their skills, required ones first. Names and
/// skills come straight from `results`.
pub fn deterministic_response(intent: &QueryIntent, results: &[SearchResult], mentions: usize) -> String {
    if results.is_empty() {
        return "I couldn't find any candidates matching that request yet.".to_string();
    }

    let noun = if results.len() == 1 { "candidate" } else { "candidates" };
    let mut text = format!("I found {} {noun} for your request.", results.len());

    let lines: Vec<String> = results
        .iter()
        .take(mentions)
        .map(|r| {
            let matched = r.skill_matches.iter().filter(|m| m.matched).filter_map(|m| {
                let needle = m.term.to_lowercase();
                r.skills.iter().find(|s| s.name.to_lowercase().contains(&needle))
            });
            let mut skills: Vec<&str> = Vec::new();
            for s in matched.chain(r.skills.iter()) {
                if skills.len() == SKILLS_PER_CANDIDATE {
                    break;
                }
                if !skills.contains(&s.name.as_str()) {
                    skills.push(s.name.as_str());
                }
            }
            if skills.is_empty() {
                candidate_label(r).to_string()
            } else {
                format!("{} ({})", candidate_label(r), skills.join(", "))
            }
        })
        .collect();

    let label = if intent.required_skills.is_empty() {
        "Top matches"
    } else {
        "Best skill matches"
    };
    text.push_str(&format!(" {label}: {}.", lines.join("; ")));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Skill;
    use crate::models::search::SkillMatch;
    use crate::profile::vocabulary::SkillVocabulary;

    fn result(name: &str, skills: &[&str], matched: &[(&str, bool)]) -> SearchResult {
        SearchResult {
            account_id: name.to_lowercase(),
            display_name: name.into(),
            email: String::new(),
            summary: String::new(),
            skills: skills.iter().map(|s| Skill::named(*s)).collect(),
            score: 0.5,
            similarity: 0.5,
            skill_matches: matched
                .iter()
                .map(|(t, m)| SkillMatch {
                    term: t.to_string(),
                    matched: *m,
                })
                .collect(),
        }
    }

    fn intent(msg: &str) -> QueryIntent {
        parse_intent(msg, SkillVocabulary::standard())
    }

    #[test]
    fn test_deterministic_response_names_top_candidates() {
        let results = vec![
            result("Ada Lovelace", &["Docker", "Python", "AWS"], &[("Python", true), ("AWS", true)]),
            result("Bo Chen", &["Java"], &[("Python", false), ("AWS", false)]),
        ];
        let text = deterministic_response(&intent("Python with AWS"), &results, 3);
        assert_eq!(
            text,
            "I found 2 candidates for your request. Best skill matches: \
             Ada Lovelace (Python, AWS, Docker); Bo Chen (Java)."
        );
        assert!(ungrounded_entities(&text, &results, SkillVocabulary::standard()).is_empty());
    }

    #[test]
    fn test_deterministic_response_respects_mention_cap() {
        let results = vec![
            result("Ann Lee", &[], &[]),
            result("Ben Ode", &[], &[]),
            result("Cy Park", &[], &[]),
        ];
        let text = deterministic_response(&intent("find engineers"), &results, 2);
        assert_eq!(text, "I found 3 candidates for your request. Top matches: Ann Lee; Ben Ode.");
    }

    #[test]
    fn test_deterministic_response_when_empty() {
        let text = deterministic_response(&intent("find Rust engineers"), &[], 3);
        assert!(text.contains("couldn't find"));
    }
}
