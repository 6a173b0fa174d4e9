//! Known-skill vocabulary shared by the profile normalizer and query understanding.
//!
//! Matching is token based: text and aliases go through the same tokenizer, so
//! `scikit-learn`, `Scikit Learn` and `scikit learn` all resolve to one term.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    ProgrammingLanguage,
    WebTechnology,
    Database,
    CloudPlatform,
    DataScience,
}

struct TermDef {
    canonical: &'static str,
    category: SkillCategory,
    /// Matched case-insensitively.
    aliases: &'static [&'static str],
    /// Matched only with this exact casing (short or common-word names).
    exact: &'static [&'static str],
}

use SkillCategory::*;

const TERMS: &[TermDef] = &[
    // Programming languages
    TermDef { canonical: "Python", category: ProgrammingLanguage, aliases: &["python", "python3"], exact: &[] },
    TermDef { canonical: "Java", category: ProgrammingLanguage, aliases: &["java"], exact: &[] },
    TermDef { canonical: "JavaScript", category: ProgrammingLanguage, aliases: &["javascript", "js", "ecmascript"], exact: &[] },
    TermDef { canonical: "TypeScript", category: ProgrammingLanguage, aliases: &["typescript", "ts"], exact: &[] },
    TermDef { canonical: "C++", category: ProgrammingLanguage, aliases: &["c++", "cpp"], exact: &[] },
    TermDef { canonical: "C#", category: ProgrammingLanguage, aliases: &["c#", "csharp"], exact: &[] },
    TermDef { canonical: "Ruby", category: ProgrammingLanguage, aliases: &["ruby"], exact: &[] },
    TermDef { canonical: "PHP", category: ProgrammingLanguage, aliases: &["php"], exact: &[] },
    TermDef { canonical: "Go", category: ProgrammingLanguage, aliases: &["golang"], exact: &["Go"] },
    TermDef { canonical: "Rust", category: ProgrammingLanguage, aliases: &["rust"], exact: &[] },
    TermDef { canonical: "Kotlin", category: ProgrammingLanguage, aliases: &["kotlin"], exact: &[] },
    TermDef { canonical: "Swift", category: ProgrammingLanguage, aliases: &[], exact: &["Swift"] },
    TermDef { canonical: "Scala", category: ProgrammingLanguage, aliases: &["scala"], exact: &[] },
    TermDef { canonical: "R", category: ProgrammingLanguage, aliases: &[], exact: &["R"] },
    TermDef { canonical: "MATLAB", category: ProgrammingLanguage, aliases: &["matlab"], exact: &[] },
    TermDef { canonical: "Perl", category: ProgrammingLanguage, aliases: &["perl"], exact: &[] },
    TermDef { canonical: "Shell", category: ProgrammingLanguage, aliases: &["shell", "bash", "shell scripting"], exact: &[] },
    TermDef { canonical: "SQL", category: ProgrammingLanguage, aliases: &["sql"], exact: &[] },
    // Web technologies
    TermDef { canonical: "HTML", category: WebTechnology, aliases: &["html", "html5"], exact: &[] },
    TermDef { canonical: "CSS", category: WebTechnology, aliases: &["css", "css3"], exact: &[] },
    TermDef { canonical: "React", category: WebTechnology, aliases: &["react", "reactjs", "react.js"], exact: &[] },
    TermDef { canonical: "Angular", category: WebTechnology, aliases: &["angular", "angularjs"], exact: &[] },
    TermDef { canonical: "Vue", category: WebTechnology, aliases: &["vue", "vue.js", "vuejs"], exact: &[] },
    TermDef { canonical: "Node.js", category: WebTechnology, aliases: &["node.js", "nodejs", "node js"], exact: &["Node"] },
    TermDef { canonical: "Express", category: WebTechnology, aliases: &["express.js", "expressjs"], exact: &["Express"] },
    TermDef { canonical: "Django", category: WebTechnology, aliases: &["django"], exact: &[] },
    TermDef { canonical: "Flask", category: WebTechnology, aliases: &["flask"], exact: &[] },
    TermDef { canonical: "FastAPI", category: WebTechnology, aliases: &["fastapi"], exact: &[] },
    TermDef { canonical: "Spring", category: WebTechnology, aliases: &["spring boot", "springboot"], exact: &["Spring"] },
    TermDef { canonical: "Laravel", category: WebTechnology, aliases: &["laravel"], exact: &[] },
    TermDef { canonical: "jQuery", category: WebTechnology, aliases: &["jquery"], exact: &[] },
    TermDef { canonical: "Bootstrap", category: WebTechnology, aliases: &[], exact: &["Bootstrap"] },
    TermDef { canonical: "Tailwind", category: WebTechnology, aliases: &["tailwind", "tailwindcss", "tailwind css"], exact: &[] },
    // Databases
    TermDef { canonical: "MySQL", category: Database, aliases: &["mysql"], exact: &[] },
    TermDef { canonical: "PostgreSQL", category: Database, aliases: &["postgresql", "postgres", "psql"], exact: &[] },
    TermDef { canonical: "MongoDB", category: Database, aliases: &["mongodb", "mongo"], exact: &[] },
    TermDef { canonical: "Redis", category: Database, aliases: &["redis"], exact: &[] },
    TermDef { canonical: "Elasticsearch", category: Database, aliases: &["elasticsearch", "elastic search"], exact: &[] },
    TermDef { canonical: "Cassandra", category: Database, aliases: &["cassandra"], exact: &[] },
    TermDef { canonical: "Oracle", category: Database, aliases: &["oracle db", "oracle database"], exact: &["Oracle"] },
    TermDef { canonical: "SQLite", category: Database, aliases: &["sqlite"], exact: &[] },
    TermDef { canonical: "MariaDB", category: Database, aliases: &["mariadb"], exact: &[] },
    TermDef { canonical: "Neo4j", category: Database, aliases: &["neo4j"], exact: &[] },
    TermDef { canonical: "DynamoDB", category: Database, aliases: &["dynamodb"], exact: &[] },
    // Cloud platforms and delivery tooling
    TermDef { canonical: "AWS", category: CloudPlatform, aliases: &["aws", "amazon web services"], exact: &[] },
    TermDef { canonical: "Azure", category: CloudPlatform, aliases: &["azure", "microsoft azure"], exact: &[] },
    TermDef { canonical: "GCP", category: CloudPlatform, aliases: &["gcp", "google cloud", "google cloud platform"], exact: &[] },
    TermDef { canonical: "Kubernetes", category: CloudPlatform, aliases: &["kubernetes", "k8s"], exact: &[] },
    TermDef { canonical: "Docker", category: CloudPlatform, aliases: &["docker"], exact: &[] },
    TermDef { canonical: "Terraform", category: CloudPlatform, aliases: &["terraform"], exact: &[] },
    TermDef { canonical: "Ansible", category: CloudPlatform, aliases: &["ansible"], exact: &[] },
    TermDef { canonical: "Jenkins", category: CloudPlatform, aliases: &["jenkins"], exact: &[] },
    TermDef { canonical: "GitLab", category: CloudPlatform, aliases: &["gitlab"], exact: &[] },
    TermDef { canonical: "GitHub Actions", category: CloudPlatform, aliases: &["github actions"], exact: &[] },
    // Data science
    TermDef { canonical: "Machine Learning", category: DataScience, aliases: &["machine learning"], exact: &["ML"] },
    TermDef { canonical: "Deep Learning", category: DataScience, aliases: &["deep learning"], exact: &[] },
    TermDef { canonical: "TensorFlow", category: DataScience, aliases: &["tensorflow"], exact: &[] },
    TermDef { canonical: "PyTorch", category: DataScience, aliases: &["pytorch", "torch"], exact: &[] },
    TermDef { canonical: "scikit-learn", category: DataScience, aliases: &["scikit-learn", "sklearn"], exact: &[] },
    TermDef { canonical: "Pandas", category: DataScience, aliases: &["pandas"], exact: &[] },
    TermDef { canonical: "NumPy", category: DataScience, aliases: &["numpy"], exact: &[] },
    TermDef { canonical: "Matplotlib", category: DataScience, aliases: &["matplotlib"], exact: &[] },
    TermDef { canonical: "Seaborn", category: DataScience, aliases: &["seaborn"], exact: &[] },
    TermDef { canonical: "Jupyter", category: DataScience, aliases: &["jupyter"], exact: &[] },
    TermDef { canonical: "Spark", category: DataScience, aliases: &["apache spark", "pyspark"], exact: &["Spark"] },
    TermDef { canonical: "Hadoop", category: DataScience, aliases: &["hadoop"], exact: &[] },
];

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub span: Range<usize>,
}

/// A vocabulary hit in a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillMention {
    pub canonical: &'static str,
    /// Byte range of the matched phrase in the source text.
    pub span: Range<usize>,
}

struct AliasEntry {
    term: usize,
    /// Required exact surface form, for case-sensitive aliases.
    exact: Option<&'static str>,
}

pub struct SkillVocabulary {
    phrases: HashMap<String, Vec<AliasEntry>>,
    max_phrase_tokens: usize,
}

static STANDARD: LazyLock<SkillVocabulary> = LazyLock::new(SkillVocabulary::build);

impl SkillVocabulary {
    /// The built-in vocabulary.
    pub fn standard() -> &'static SkillVocabulary {
        &STANDARD
    }

    fn build() -> Self {
        let mut phrases: HashMap<String, Vec<AliasEntry>> = HashMap::new();
        let mut max_phrase_tokens = 1;

        for (idx, def) in TERMS.iter().enumerate() {
            let ci = def.aliases.iter().map(|a| (*a, None));
            let cs = def.exact.iter().map(|a| (*a, Some(*a)));
            for (alias, exact) in ci.chain(cs) {
                let tokens = tokenize(alias);
                max_phrase_tokens = max_phrase_tokens.max(tokens.len());
                let key = phrase_key(&tokens);
                phrases
                    .entry(key)
                    .or_default()
                    .push(AliasEntry { term: idx, exact });
            }
        }

        Self {
            phrases,
            max_phrase_tokens,
        }
    }

    /// Finds all non-overlapping vocabulary mentions, longest phrase first, in text order.
    pub fn find_mentions(&self, text: &str) -> Vec<SkillMention> {
        let tokens = tokenize(text);
        let mut mentions = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let longest = self.max_phrase_tokens.min(tokens.len() - i);
            let hit = (1..=longest)
                .rev()
                .find_map(|len| self.match_phrase(text, &tokens[i..i + len]).map(|t| (t, len)));

            match hit {
                Some((term, len)) => {
                    mentions.push(SkillMention {
                        canonical: TERMS[term].canonical,
                        span: tokens[i].span.start..tokens[i + len - 1].span.end,
                    });
                    i += len;
                }
                None => i += 1,
            }
        }

        mentions
    }

    /// Distinct canonical skills mentioned in `text`, in first-mention order.
    pub fn distinct_skills(&self, text: &str) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for m in self.find_mentions(text) {
            if !seen.contains(&m.canonical) {
                seen.push(m.canonical);
            }
        }
        seen
    }

    /// Maps a free-standing skill label (e.g. a GitHub language or topic) to its
    /// canonical vocabulary name, if the whole label is one known phrase.
    pub fn canonicalize(&self, label: &str) -> Option<&'static str> {
        self.term_for(label).map(|t| TERMS[t].canonical)
    }

    /// Category of a stored skill name, matched on canonical name or alias.
    pub fn category(&self, name: &str) -> Option<SkillCategory> {
        TERMS
            .iter()
            .position(|def| def.canonical.eq_ignore_ascii_case(name.trim()))
            .or_else(|| self.term_for(name))
            .map(|t| TERMS[t].category)
    }

    /// True when `text` mentions the skill `name`. Vocabulary skills go through
    /// mention matching, so `Go` needs its exact casing; other names fall back to
    /// [`contains_phrase`].
    pub fn mentions_skill(&self, text: &str, name: &str) -> bool {
        match self.canonicalize(name) {
            Some(canonical) => self.find_mentions(text).iter().any(|m| m.canonical == canonical),
            None => contains_phrase(text, name),
        }
    }

    fn term_for(&self, label: &str) -> Option<usize> {
        let tokens = tokenize(label);
        if tokens.is_empty() {
            return None;
        }
        self.match_phrase(label, &tokens)
    }

    fn match_phrase(&self, text: &str, tokens: &[Token<'_>]) -> Option<usize> {
        let entries = self.phrases.get(&phrase_key(tokens))?;
        let surface = &text[tokens[0].span.start..tokens[tokens.len() - 1].span.end];
        entries
            .iter()
            .find(|e| match e.exact {
                None => true,
                Some(exact) => tokens.len() == 1 && surface == exact,
            })
            .map(|e| e.term)
    }
}

/// Splits text into skill-bearing tokens. `+`, `#` and inner `.` stay inside a token so
/// `C++`, `C#` and `Node.js` survive; trailing dots (sentence ends) are dropped.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    let is_token_char = |c: char| c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '_');

    for (idx, c) in text.char_indices() {
        match (start, is_token_char(c)) {
            (None, true) => start = Some(idx),
            (Some(s), false) => {
                push_token(text, s, idx, &mut tokens);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        push_token(text, s, text.len(), &mut tokens);
    }

    tokens
}

fn push_token<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Token<'a>>) {
    let raw = &text[start..end];
    let trimmed_front = raw.trim_start_matches('.');
    let start = start + (raw.len() - trimmed_front.len());
    let raw = trimmed_front.trim_end_matches('.');
    if raw.is_empty() {
        return;
    }
    out.push(Token {
        raw,
        lower: raw.to_lowercase(),
        span: start..start + raw.len(),
    });
}

/// True when `needle` occurs in `haystack` as a whole token sequence, ignoring case.
/// `Go` is found in "Go services" but not in "good".
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let needle: Vec<String> = tokenize(needle).into_iter().map(|t| t.lower).collect();
    if needle.is_empty() {
        return false;
    }
    let hay: Vec<String> = tokenize(haystack).into_iter().map(|t| t.lower).collect();
    hay.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn phrase_key(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|t| t.lower.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(text: &str) -> Vec<&'static str> {
        SkillVocabulary::standard().distinct_skills(text)
    }

    #[test]
    fn test_tokenize_keeps_symbols_and_drops_sentence_dots() {
        let toks: Vec<_> = tokenize("Built APIs in C++, C# and Node.js.")
            .into_iter()
            .map(|t| t.raw)
            .collect();
        assert_eq!(toks, vec!["Built", "APIs", "in", "C++", "C#", "and", "Node.js"]);
    }

    #[test]
    fn test_token_spans_point_into_source() {
        let text = "  Rust.";
        let toks = tokenize(text);
        assert_eq!(toks.len(), 1);
        assert_eq!(&text[toks[0].span.clone()], "Rust");
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(skills("python, AWS and docker"), vec!["Python", "AWS", "Docker"]);
    }

    #[test]
    fn test_multi_word_phrases_prefer_longest() {
        assert_eq!(
            skills("Deployed on Google Cloud Platform with GitHub Actions"),
            vec!["GCP", "GitHub Actions"]
        );
        assert_eq!(skills("machine learning with scikit-learn"), vec!["Machine Learning", "scikit-learn"]);
    }

    #[test]
    fn test_java_does_not_match_javascript() {
        assert_eq!(skills("JavaScript only"), vec!["JavaScript"]);
    }

    #[test]
    fn test_ambiguous_short_names_need_exact_case() {
        assert!(skills("we go to the office").is_empty());
        assert_eq!(skills("Services written in Go"), vec!["Go"]);
        assert_eq!(skills("golang services"), vec!["Go"]);
        assert!(skills("in the spring of 2020").is_empty());
    }

    #[test]
    fn test_aliases_resolve_to_canonical() {
        assert_eq!(skills("k8s and postgres"), vec!["Kubernetes", "PostgreSQL"]);
    }

    #[test]
    fn test_mention_spans() {
        let text = "Senior Python developer";
        let mentions = SkillVocabulary::standard().find_mentions(text);
        assert_eq!(mentions.len(), 1);
        assert_eq!(&text[mentions[0].span.clone()], "Python");
    }

    #[test]
    fn test_category_lookup() {
        let vocab = SkillVocabulary::standard();
        assert_eq!(vocab.category("Python"), Some(SkillCategory::ProgrammingLanguage));
        assert_eq!(vocab.category("postgresql"), Some(SkillCategory::Database));
        assert_eq!(vocab.category("k8s"), Some(SkillCategory::CloudPlatform));
        assert_eq!(vocab.category("go"), Some(SkillCategory::ProgrammingLanguage));
        assert_eq!(vocab.category("HCL"), None);
    }

    #[test]
    fn test_mentions_skill_respects_exact_case() {
        let vocab = SkillVocabulary::standard();
        assert!(!vocab.mentions_skill("they go above and beyond", "Go"));
        assert!(vocab.mentions_skill("ships Go and golang services", "Go"));
        assert!(vocab.mentions_skill("uses python3 daily", "Python"));
        assert!(vocab.mentions_skill("writes HCL modules", "HCL"));
        assert!(!vocab.mentions_skill("writes Terraform", "HCL"));
    }

    #[test]
    fn test_contains_phrase_is_token_aware() {
        assert!(contains_phrase("Builds Go services", "go"));
        assert!(!contains_phrase("A good engineer", "Go"));
        assert!(contains_phrase("Skilled in C++ and Node.js.", "node.js"));
        assert!(contains_phrase("certified: AWS Certified Developer", "aws certified developer"));
        assert!(!contains_phrase("anything", ""));
    }

    #[test]
    fn test_canonicalize_labels() {
        let vocab = SkillVocabulary::standard();
        assert_eq!(vocab.canonicalize("python"), Some("Python"));
        assert_eq!(vocab.canonicalize("machine-learning"), Some("Machine Learning"));
        assert_eq!(vocab.canonicalize("Go"), Some("Go"));
        assert_eq!(vocab.canonicalize("HCL"), None);
        assert_eq!(vocab.canonicalize(""), None);
    }
}
