mod collaborators;
mod config;
mod db;
mod embedding;
mod errors;
mod index;
mod llm_client;
mod models;
mod profile;
mod routes;
mod search;
mod state;
mod store;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::collaborators::github::GithubFetcher;
use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::hash::HashEmbedder;
use crate::embedding::http::HttpEmbedder;
use crate::embedding::Embedder;
use crate::index::memory::MemoryVectorIndex;
use crate::index::postgres::PgVectorIndex;
use crate::index::VectorIndex;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryProfileStore;
use crate::store::postgres::PgProfileStore;
use crate::store::ProfileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));

    let matching = Arc::new(config.matching.clone());

    // Profile store + vector index: PostgreSQL/pgvector when configured, in-memory otherwise
    let (store, index): (Arc<dyn ProfileStore>, Arc<dyn VectorIndex>) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            let index = PgVectorIndex::new(pool.clone(), matching.embedding_dimension);
            let stale = index.stale_entries().await?;
            if stale > 0 {
                warn!(
                    stale,
                    dimension = matching.embedding_dimension,
                    "Vector entries with another dimension are excluded from search until re-ingested"
                );
            }
            (Arc::new(PgProfileStore::new(pool)), Arc::new(index))
        }
        None => {
            warn!("DATABASE_URL not set, profiles and vectors are kept in memory");
            (
                Arc::new(MemoryProfileStore::new()),
                Arc::new(MemoryVectorIndex::new(matching.embedding_dimension)),
            )
        }
    };

    // Embedding provider
    let embedder: Arc<dyn Embedder> = match &config.embedding_api_url {
        Some(url) => Arc::new(
            HttpEmbedder::new(
                url.clone(),
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
                matching.embedding_dimension,
                matching.embed_timeout,
            )
            .context("failed to build embedding client")?,
        ),
        None => {
            info!("EMBEDDING_API_URL not set, using the feature-hashing embedder");
            Arc::new(HashEmbedder::new(matching.embedding_dimension))
        }
    };

    // Optional text generation
    let generator: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), matching.generation_timeout)
                .context("failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(llm))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set, summaries and chat answers are deterministic");
            None
        }
    };

    let github = GithubFetcher::new(config.github_token.clone(), matching.fetch_timeout)?;

    let state = AppState::new(matching, embedder, index, store, generator, github)?;
    info!(backends = ?state.backends, "Services wired");

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the recruiter UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
