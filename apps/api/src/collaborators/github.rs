use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::MatchError;
use crate::models::profile::GithubActivity;

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("talent-api/", env!("CARGO_PKG_VERSION"));
const RECENT_REPOS: usize = 10;

#[derive(Debug, Deserialize)]
struct UserBody {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoBody {
    name: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    /// Repository size in KiB.
    #[serde(default)]
    size: u64,
    #[serde(default)]
    fork: bool,
}

/// Fetches public GitHub activity for a profile URL or bare username.
#[derive(Clone)]
pub struct GithubFetcher {
    client: Client,
    token: Option<String>,
}

impl GithubFetcher {
    pub fn new(token: Option<String>, timeout: Duration) -> Result<Self, MatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MatchError::FetchFailed(e.to_string()))?;
        Ok(Self { client, token })
    }

    pub async fn fetch(&self, profile_url: &str) -> Result<GithubActivity, MatchError> {
        let username = parse_username(profile_url).ok_or_else(|| {
            MatchError::FetchFailed(format!("'{profile_url}' is not a GitHub profile URL"))
        })?;

        let user: UserBody = self
            .get_json(&format!("{GITHUB_API_URL}/users/{username}"), &username)
            .await?;
        let repos: Vec<RepoBody> = self
            .get_json(
                &format!("{GITHUB_API_URL}/users/{username}/repos?sort=updated&per_page={RECENT_REPOS}"),
                &username,
            )
            .await?;

        let activity = summarize_repos(user.login, repos);
        info!(
            username = activity.username.as_deref().unwrap_or_default(),
            repos = activity.repositories.len(),
            languages = activity.languages.len(),
            "Fetched GitHub activity"
        );
        Ok(activity)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        username: &str,
    ) -> Result<T, MatchError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MatchError::FetchFailed(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(MatchError::NotFound(format!("GitHub user '{username}'"))),
            status if !status.is_success() => {
                warn!("GitHub API returned {status} for {url}");
                Err(MatchError::FetchFailed(format!("GitHub API returned {status}")))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| MatchError::FetchFailed(e.to_string())),
        }
    }
}

/// Accepts `https://github.com/octo`, `github.com/octo/`, `@octo` or `octo`.
pub fn parse_username(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches('/');
    let path = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let path = path.strip_prefix("www.").unwrap_or(path);

    let candidate = match path.strip_prefix("github.com/") {
        Some(rest) => rest.split('/').next()?,
        None if !path.contains('/') && !path.contains('.') => path.trim_start_matches('@'),
        None => return None,
    };

    let valid = !candidate.is_empty()
        && candidate.len() <= 39
        && !candidate.starts_with('-')
        && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    valid.then(|| candidate.to_string())
}

/// Languages weighted by repository size (bytes), topics and names of non-fork repos.
fn summarize_repos(login: String, repos: Vec<RepoBody>) -> GithubActivity {
    let mut language_bytes: HashMap<String, u64> = HashMap::new();
    let mut language_order: Vec<String> = Vec::new();
    let mut topics: Vec<String> = Vec::new();
    let mut repositories = Vec::new();

    for repo in repos.into_iter().filter(|r| !r.fork) {
        if let Some(lang) = repo.language.filter(|l| !l.trim().is_empty()) {
            if !language_bytes.contains_key(&lang) {
                language_order.push(lang.clone());
            }
            *language_bytes.entry(lang).or_default() += repo.size.max(1) * 1024;
        }
        for topic in repo.topics {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        repositories.push(repo.name);
    }

    GithubActivity {
        username: Some(login),
        languages: language_order
            .into_iter()
            .map(|l| {
                let bytes = language_bytes.get(&l).copied().unwrap_or_default();
                (l, bytes)
            })
            .collect(),
        repositories,
        topics,
        contributions: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_username_variants() {
        assert_eq!(parse_username("https://github.com/octocat").as_deref(), Some("octocat"));
        assert_eq!(parse_username("github.com/octo-cat/").as_deref(), Some("octo-cat"));
        assert_eq!(
            parse_username("https://www.github.com/octocat/hello-world").as_deref(),
            Some("octocat")
        );
        assert_eq!(parse_username("@octocat").as_deref(), Some("octocat"));
        assert_eq!(parse_username("https://gitlab.com/octocat"), None);
        assert_eq!(parse_username("not a user"), None);
        assert_eq!(parse_username(""), None);
    }

    #[test]
    fn test_summarize_repos_skips_forks_and_weights_languages() {
        let repos: Vec<RepoBody> = serde_json::from_str(
            r#"[
                {"name": "api", "language": "Rust", "topics": ["web", "axum"], "size": 300, "fork": false},
                {"name": "ml", "language": "Python", "topics": ["web"], "size": 100},
                {"name": "tools", "language": "Rust", "size": 50},
                {"name": "forked", "language": "Go", "size": 9000, "fork": true},
                {"name": "notes", "language": null, "size": 1}
            ]"#,
        )
        .unwrap();
        let gh = summarize_repos("octo".into(), repos);
        assert_eq!(gh.username.as_deref(), Some("octo"));
        assert_eq!(gh.repositories, vec!["api", "ml", "tools", "notes"]);
        assert_eq!(gh.topics, vec!["web", "axum"]);
        assert_eq!(gh.ranked_languages(), vec!["Rust", "Python"]);
        assert_eq!(gh.languages[0].1, 350 * 1024);
    }
}
