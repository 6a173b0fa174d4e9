//! Grounding check for chat responses: every candidate name and skill the text mentions
//! must come from the ranked result list.

use std::collections::HashSet;

use crate::models::profile::normalize_name;
use crate::models::search::SearchResult;
use crate::profile::vocabulary::{tokenize, SkillMention, SkillVocabulary, Token};

/// Words that may start a capitalised run without making it a name.
const SENTENCE_WORDS: &[&str] = &[
    "i", "a", "an", "the", "here", "there", "these", "they", "both", "all", "top", "based",
    "no", "yes", "for", "and", "with", "of", "in", "on", "we", "you", "your", "my",
];

/// Display label for a result: its name, or the account id when unnamed.
pub fn candidate_label(result: &SearchResult) -> &str {
    match result.display_name.trim() {
        "" => result.account_id.as_str(),
        name => name,
    }
}

/// Returns the ungrounded entities found in `text`; empty means grounded.
///
/// Skills: any vocabulary skill mentioned must be a skill of some result.
/// Names: within a run of capitalised words, whatever is not a result's name or a skill
/// mention must not itself be two or more capitalised words.
pub fn ungrounded_entities(
    text: &str,
    results: &[SearchResult],
    vocab: &SkillVocabulary,
) -> Vec<String> {
    let labels: Vec<&str> = results.iter().map(candidate_label).collect();
    let name_tokens: Vec<Vec<String>> = labels
        .iter()
        .map(|l| tokenize(l).into_iter().map(|t| t.lower).collect())
        .collect();
    let known_skills: HashSet<String> = results
        .iter()
        .flat_map(|r| r.skills.iter().map(|s| s.normalized_name()))
        .collect();

    let masked = mask_names(text, &labels);
    let mut problems = Vec::new();

    for skill in vocab.distinct_skills(&masked) {
        if !known_skills.contains(&normalize_name(skill)) {
            problems.push(skill.to_string());
        }
    }

    let mentions = vocab.find_mentions(text);
    for run in capitalised_runs(text) {
        problems.extend(unexplained_words(&run, &name_tokens, &mentions));
    }

    problems
}

/// Splits a capitalised run into the words explained by a result name or a skill
/// mention and the rest; returns leftover stretches of two or more words.
fn unexplained_words(run: &[Token<'_>], names: &[Vec<String>], mentions: &[SkillMention]) -> Vec<String> {
    let mut covered = vec![false; run.len()];

    for name in names.iter().filter(|n| !n.is_empty() && n.len() <= run.len()) {
        for start in 0..=run.len() - name.len() {
            let window = &run[start..start + name.len()];
            if window.iter().zip(name).all(|(t, n)| t.lower == *n) {
                covered[start..start + name.len()].fill(true);
            }
        }
    }
    for (i, token) in run.iter().enumerate() {
        if mentions
            .iter()
            .any(|m| m.span.start <= token.span.start && token.span.end <= m.span.end)
        {
            covered[i] = true;
        }
    }

    let mut leftovers = Vec::new();
    let mut stretch: Vec<Token<'_>> = Vec::new();
    for (token, is_covered) in run.iter().zip(&covered) {
        if *is_covered {
            flush_run(&mut stretch, &mut leftovers);
        } else {
            stretch.push(token.clone());
        }
    }
    flush_run(&mut stretch, &mut leftovers);

    leftovers
        .iter()
        .map(|words| words.iter().map(|t| t.raw).collect::<Vec<_>>().join(" "))
        .collect()
}

/// Blanks out candidate names so a name like "Ruby Chen" is not read as a skill.
fn mask_names(text: &str, labels: &[&str]) -> String {
    let mut out = text.to_string();
    for label in labels.iter().filter(|l| !l.is_empty()) {
        out = out.replace(label, &" ".repeat(label.len()));
    }
    out
}

/// Runs of 2+ consecutive capitalised words, with leading sentence words dropped.
fn capitalised_runs(text: &str) -> Vec<Vec<Token<'_>>> {
    let mut runs = Vec::new();
    let mut current: Vec<Token<'_>> = Vec::new();
    let mut prev_end = 0;

    for token in tokenize(text) {
        let capitalised = token.raw.chars().next().is_some_and(char::is_uppercase);
        // Punctuation between words ends a run; plain spaces do not.
        let adjacent = text[prev_end..token.span.start].chars().all(char::is_whitespace);
        if !capitalised || !adjacent {
            flush_run(&mut current, &mut runs);
        }
        prev_end = token.span.end;
        if capitalised {
            current.push(token);
        }
    }
    flush_run(&mut current, &mut runs);
    runs
}

fn flush_run<'a>(current: &mut Vec<Token<'a>>, runs: &mut Vec<Vec<Token<'a>>>) {
    let start = current
        .iter()
        .position(|t| !SENTENCE_WORDS.contains(&t.lower.as_str()))
        .unwrap_or(current.len());
    let run: Vec<Token<'a>> = current.drain(..).skip(start).collect();
    if run.len() >= 2 {
        runs.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::Skill;

    fn result(name: &str, skills: &[&str]) -> SearchResult {
        SearchResult {
            account_id: name.to_lowercase().replace(' ', "-"),
            display_name: name.into(),
            email: String::new(),
            summary: String::new(),
            skills: skills.iter().map(|s| Skill::named(*s)).collect(),
            score: 0.5,
            similarity: 0.5,
            skill_matches: vec![],
        }
    }

    fn check(text: &str, results: &[SearchResult]) -> Vec<String> {
        ungrounded_entities(text, results, SkillVocabulary::standard())
    }

    #[test]
    fn test_grounded_text_passes() {
        let results = [result("Ada Lovelace", &["Python", "AWS"]), result("Bo Chen", &["Java"])];
        let text = "I found 2 candidates. Ada Lovelace knows Python and AWS; Bo Chen works in Java.";
        assert!(check(text, &results).is_empty());
    }

    #[test]
    fn test_invented_skill_is_flagged() {
        let results = [result("Ada Lovelace", &["Python"])];
        assert_eq!(check("Ada Lovelace is great at Kubernetes.", &results), vec!["Kubernetes"]);
    }

    #[test]
    fn test_invented_candidate_is_flagged() {
        let results = [result("Ada Lovelace", &["Python"])];
        assert_eq!(
            check("Ada Lovelace and Grace Hopper both know Python.", &results),
            vec!["Grace Hopper"]
        );
    }

    #[test]
    fn test_invented_name_next_to_real_skill_is_flagged() {
        let results = [result("Ada Lovelace", &["Python"])];
        assert_eq!(
            check("Python Expert Grace Hopper is your best bet.", &results),
            vec!["Expert Grace Hopper"]
        );
    }

    #[test]
    fn test_capitalised_word_before_real_name_is_fine() {
        let results = [result("Ada Lovelace", &["Python"])];
        assert!(check("Consider Ada Lovelace for Python work.", &results).is_empty());
        assert_eq!(
            check("Consider Ada Lovelace Grace Hopper for Python work.", &results),
            vec!["Grace Hopper"]
        );
    }

    #[test]
    fn test_first_name_only_and_skill_phrases_are_fine() {
        let results = [result("Ada Lovelace", &["Machine Learning"])];
        assert!(check("Top Pick: Ada brings Machine Learning depth.", &results).is_empty());
    }

    #[test]
    fn test_name_containing_skill_word_is_not_a_skill() {
        let results = [result("Ruby Chen", &["Java"])];
        assert!(check("Ruby Chen is strong in Java.", &results).is_empty());
    }

    #[test]
    fn test_unnamed_candidates_use_account_id() {
        let mut r = result("", &[]);
        r.account_id = "acc-7".into();
        assert_eq!(candidate_label(&r), "acc-7");
    }
}
