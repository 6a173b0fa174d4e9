//! Best-effort certification extraction.
//!
//! A qualifying keyword (`certified`, `certification`, `certificate`) is paired with the
//! proper-noun phrase next to it on the same line. Well-known standalone credentials are
//! also recognised. Never fails; unparseable lines simply yield nothing.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::profile::Certification;

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcertifi(?:ed|cations?|cates?)\b").expect("valid keyword regex")
});

static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}+#&.'/]*").expect("valid word regex")
});

static STANDALONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:CISSP|PMP|CCNA|CCNP|CKA|CKAD|CISA|CISM)\b|\bCompTIA\s+[A-Z][A-Za-z]*\+?")
        .expect("valid standalone regex")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19[89]\d|20\d{2})\b").expect("valid year regex"));

/// Issuer inferred when the certification name contains one of these words.
const KNOWN_ISSUERS: &[(&str, &str)] = &[
    ("AWS", "Amazon Web Services"),
    ("Amazon", "Amazon Web Services"),
    ("Azure", "Microsoft"),
    ("Microsoft", "Microsoft"),
    ("Google", "Google"),
    ("GCP", "Google"),
    ("Oracle", "Oracle"),
    ("Cisco", "Cisco"),
    ("CCNA", "Cisco"),
    ("CCNP", "Cisco"),
    ("CompTIA", "CompTIA"),
    ("Kubernetes", "CNCF"),
    ("CKA", "CNCF"),
    ("CKAD", "CNCF"),
    ("PMP", "PMI"),
    ("Scrum", "Scrum Alliance"),
    ("CISSP", "ISC2"),
    ("CISA", "ISACA"),
    ("CISM", "ISACA"),
    ("HashiCorp", "HashiCorp"),
    ("Terraform", "HashiCorp"),
    ("Salesforce", "Salesforce"),
    ("Red Hat", "Red Hat"),
];

/// Connectors allowed inside a phrase when followed by another proper word.
const CONNECTORS: &[&str] = &["of", "in", "for", "and", "on"];

const MAX_BEFORE_WORDS: usize = 4;
const MAX_AFTER_WORDS: usize = 6;

struct Word {
    span: Range<usize>,
    text: String,
}

impl Word {
    fn is_proper(&self) -> bool {
        self.text
            .chars()
            .next()
            .map(|c| c.is_uppercase() || c.is_ascii_digit())
            .unwrap_or(false)
    }

    fn is_keyword(&self) -> bool {
        KEYWORD.is_match(&self.text)
    }

    fn is_connector(&self) -> bool {
        CONNECTORS.contains(&self.text.to_lowercase().as_str())
    }
}

/// Extracts certifications from free text, deduplicated by normalized name.
pub fn extract_certifications(text: &str) -> Vec<Certification> {
    let mut out: Vec<Certification> = Vec::new();

    for line in text.lines() {
        for cert in extract_from_line(line) {
            let key = cert.normalized_name();
            if !out.iter().any(|c| c.normalized_name() == key) {
                out.push(cert);
            }
        }
    }

    out
}

fn extract_from_line(line: &str) -> Vec<Certification> {
    let words = split_words(line);
    let mut candidates: Vec<Range<usize>> = Vec::new();

    for (idx, word) in words.iter().enumerate() {
        if !word.is_keyword() {
            continue;
        }
        let is_certified = word.text.to_lowercase() == "certified";
        let before = walk_before(line, &words, idx);
        let after = walk_after(line, &words, idx);

        let span = match (before, after) {
            (None, None) => continue,
            (Some(b), Some(a)) if is_certified => b.start..a.end,
            (None, Some(a)) if is_certified => word.span.start..a.end,
            (Some(b), None) => b.start..word.span.end,
            (_, Some(a)) => a,
        };
        candidates.push(span);
    }

    for m in STANDALONE.find_iter(line) {
        if line[..m.start()].trim_end().ends_with('(') {
            continue;
        }
        candidates.push(m.start()..m.end());
    }

    // Longest span wins where candidates overlap.
    candidates.sort_by(|a, b| (b.end - b.start).cmp(&(a.end - a.start)));
    let mut accepted: Vec<Range<usize>> = Vec::new();
    for c in candidates {
        if !accepted.iter().any(|a| a.start < c.end && c.start < a.end) {
            accepted.push(c);
        }
    }
    accepted.sort_by_key(|r| r.start);

    let issued_year = YEAR
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    accepted
        .into_iter()
        .map(|span| {
            let name = line[span].trim().to_string();
            Certification {
                issuer: infer_issuer(&name),
                name,
                issued_year,
            }
        })
        .collect()
}

fn split_words(line: &str) -> Vec<Word> {
    WORD.find_iter(line)
        .filter_map(|m| {
            let text = m.as_str().trim_end_matches(['.', '\'', '/']);
            if text.is_empty() {
                return None;
            }
            Some(Word {
                span: m.start()..m.start() + text.len(),
                text: text.to_string(),
            })
        })
        .collect()
}

/// True when only spaces or dashes separate the two byte offsets.
fn joined(line: &str, left_end: usize, right_start: usize) -> bool {
    line[left_end..right_start]
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, '-' | '–' | '—'))
}

fn walk_before(line: &str, words: &[Word], keyword: usize) -> Option<Range<usize>> {
    let mut start: Option<usize> = None;
    let mut boundary = words[keyword].span.start;
    let mut taken = 0;

    for w in words[..keyword].iter().rev() {
        if taken == MAX_BEFORE_WORDS
            || !w.is_proper()
            || w.is_keyword()
            || !joined(line, w.span.end, boundary)
        {
            break;
        }
        start = Some(w.span.start);
        boundary = w.span.start;
        taken += 1;
    }

    start.map(|s| s..line[..words[keyword].span.start].trim_end().len().max(s))
}

fn walk_after(line: &str, words: &[Word], keyword: usize) -> Option<Range<usize>> {
    let mut boundary = words[keyword].span.end;
    let mut first: Option<usize> = None;
    let mut last_end = boundary;
    let mut taken = 0;
    let mut i = keyword + 1;

    // A label separator may follow the keyword: "Certification: Google Cloud ..."
    let lead = words.get(i).map(|w| &line[boundary..w.span.start]);
    if let Some(gap) = lead {
        if gap.trim().trim_matches(|c| matches!(c, ':' | '-' | '–')).is_empty() {
            boundary = words[i].span.start;
        }
    }

    while i < words.len() && taken < MAX_AFTER_WORDS {
        let w = &words[i];
        if w.is_keyword() || !joined(line, boundary, w.span.start) {
            break;
        }
        if w.is_connector() {
            // Leading connector ("Certification in X") or an inner one followed by a proper word.
            let next_ok = words
                .get(i + 1)
                .map(|n| n.is_proper() && joined(line, w.span.end, n.span.start))
                .unwrap_or(false);
            if !next_ok {
                break;
            }
            boundary = w.span.end;
            i += 1;
            continue;
        }
        if !w.is_proper() {
            break;
        }
        first.get_or_insert(w.span.start);
        last_end = w.span.end;
        boundary = w.span.end;
        taken += 1;
        i += 1;
    }

    first.map(|s| s..last_end)
}

fn infer_issuer(name: &str) -> Option<String> {
    let words: Vec<String> = split_words(name).into_iter().map(|w| w.text.to_lowercase()).collect();
    KNOWN_ISSUERS
        .iter()
        .find(|(key, _)| {
            let key_words: Vec<String> = key.split_whitespace().map(str::to_lowercase).collect();
            words
                .windows(key_words.len())
                .any(|window| window == key_words.as_slice())
        })
        .map(|(_, issuer)| issuer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        extract_certifications(text).into_iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_certified_with_prefix_and_suffix() {
        let certs = extract_certifications("AWS Certified Solutions Architect - Associate (2021)");
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].name, "AWS Certified Solutions Architect - Associate");
        assert_eq!(certs[0].issuer.as_deref(), Some("Amazon Web Services"));
        assert_eq!(certs[0].issued_year, Some(2021));
    }

    #[test]
    fn test_certified_leading_keyword_and_abbreviation_skipped() {
        let certs = extract_certifications("Certified Kubernetes Administrator (CKA)");
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].name, "Certified Kubernetes Administrator");
        assert_eq!(certs[0].issuer.as_deref(), Some("CNCF"));
    }

    #[test]
    fn test_certification_label_takes_following_phrase() {
        assert_eq!(
            names("Certification: Google Cloud Professional Data Engineer"),
            vec!["Google Cloud Professional Data Engineer"]
        );
    }

    #[test]
    fn test_certification_with_preceding_phrase() {
        assert_eq!(names("Holds the Oracle Java SE certification."), vec!["Oracle Java SE certification"]);
    }

    #[test]
    fn test_section_header_merges_into_longer_candidate() {
        assert_eq!(
            names("Certifications: Microsoft Certified Azure Developer"),
            vec!["Microsoft Certified Azure Developer"]
        );
    }

    #[test]
    fn test_standalone_credentials() {
        let certs = extract_certifications("CISSP, PMP and CompTIA Security+");
        let got: Vec<_> = certs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(got, vec!["CISSP", "PMP", "CompTIA Security+"]);
        assert_eq!(certs[1].issuer.as_deref(), Some("PMI"));
    }

    #[test]
    fn test_lowercase_mentions_are_ignored() {
        assert!(names("I am certified in nothing in particular").is_empty());
        assert!(names("Certifications").is_empty());
    }

    #[test]
    fn test_dedup_across_lines() {
        let text = "AWS Certified Developer\nRenewed: AWS Certified Developer";
        assert_eq!(names(text), vec!["AWS Certified Developer"]);
    }
}
