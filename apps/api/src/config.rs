use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When unset the service keeps profiles and vectors in memory.
    pub database_url: Option<String>,
    /// OpenAI-compatible embeddings endpoint. When unset the hashing embedder is used.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub anthropic_api_key: Option<String>,
    pub github_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub matching: MatchingConfig,
}

/// Immutable tuning shared by every matching component. Built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub embedding_dimension: usize,
    /// Weight of the rescaled vector similarity when required skill terms are present.
    pub similarity_weight: f64,
    /// Weight of the skill-overlap ratio when required skill terms are present.
    pub skill_weight: f64,
    /// Subtracted from the final score when a profile's known experience is below the hint.
    pub experience_penalty: f64,
    pub default_limit: usize,
    pub max_limit: usize,
    pub candidate_pool_factor: usize,
    pub chat_limit: usize,
    pub chat_mentions: usize,
    pub embed_timeout: Duration,
    pub generation_timeout: Duration,
    pub fetch_timeout: Duration,
    pub commit_lock_stripes: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            embedding_dimension: 384,
            similarity_weight: 0.7,
            skill_weight: 0.3,
            experience_penalty: 0.1,
            default_limit: 10,
            max_limit: 50,
            candidate_pool_factor: 3,
            chat_limit: 5,
            chat_mentions: 3,
            embed_timeout: Duration::from_secs(10),
            generation_timeout: Duration::from_secs(20),
            fetch_timeout: Duration::from_secs(15),
            commit_lock_stripes: 64,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MatchingConfig::default();
        let matching = MatchingConfig {
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", defaults.embedding_dimension)?,
            similarity_weight: parse_env("SIMILARITY_WEIGHT", defaults.similarity_weight)?,
            skill_weight: parse_env("SKILL_WEIGHT", defaults.skill_weight)?,
            experience_penalty: parse_env("EXPERIENCE_PENALTY", defaults.experience_penalty)?,
            default_limit: parse_env("SEARCH_DEFAULT_LIMIT", defaults.default_limit)?,
            max_limit: parse_env("SEARCH_MAX_LIMIT", defaults.max_limit)?,
            embed_timeout: Duration::from_secs(parse_env(
                "EMBED_TIMEOUT_SECS",
                defaults.embed_timeout.as_secs(),
            )?),
            generation_timeout: Duration::from_secs(parse_env(
                "GENERATION_TIMEOUT_SECS",
                defaults.generation_timeout.as_secs(),
            )?),
            ..defaults
        };
        matching.validate()?;

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            github_token: optional_env("GITHUB_TOKEN"),
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            matching,
        })
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.embedding_dimension > 0, "EMBEDDING_DIMENSION must be > 0");
        anyhow::ensure!(
            self.similarity_weight >= 0.0 && self.skill_weight >= 0.0,
            "score weights must be non-negative"
        );
        anyhow::ensure!(
            self.similarity_weight + self.skill_weight > 0.0,
            "score weights must not both be zero"
        );
        anyhow::ensure!(
            self.default_limit >= 1 && self.default_limit <= self.max_limit,
            "SEARCH_DEFAULT_LIMIT must be between 1 and SEARCH_MAX_LIMIT"
        );
        Ok(())
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
