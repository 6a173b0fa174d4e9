use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::search::SearchResult;
use crate::search::chat::ChatReply;
use crate::search::intent::QueryIntent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub request_id: Uuid,
    pub count: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub request_id: Uuid,
    pub total_matches: usize,
    pub requirements: QueryIntent,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub reply: ChatReply,
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let results = state
        .search
        .search(&req.query, req.limit)
        .instrument(info_span!("search", %request_id, limit = ?req.limit))
        .await?;
    Ok(Json(SearchResponse {
        request_id,
        count: results.len(),
        results,
    }))
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let (requirements, results) = state
        .search
        .match_requirements(&req.required_skills, &req.description, &req.experience_level, req.limit)
        .instrument(info_span!("match", %request_id, skills = req.required_skills.len()))
        .await?;
    Ok(Json(MatchResponse {
        request_id,
        total_matches: results.len(),
        requirements,
        results,
    }))
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let reply = state
        .chat
        .respond(&req.message)
        .instrument(info_span!("chat", %request_id))
        .await?;
    Ok(Json(ChatResponse { request_id, reply }))
}
