use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use crate::collaborators::resume_text::extract_resume_text;
use crate::errors::{AppError, MatchError};
use crate::models::profile::Profile;
use crate::profile::analytics::SkillAnalytics;
use crate::profile::ingest::{IngestRequest, IngestResponse};
use crate::state::AppState;

const MAX_ACCOUNT_ID_LEN: usize = 128;

fn validate_account_id(account_id: &str) -> Result<&str, AppError> {
    let id = account_id.trim();
    if id.is_empty() || id.len() > MAX_ACCOUNT_ID_LEN {
        return Err(AppError::Validation(format!(
            "account_id must be 1-{MAX_ACCOUNT_ID_LEN} characters"
        )));
    }
    Ok(id)
}

/// PUT /api/v1/profiles/:account_id
pub async fn handle_ingest(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    let account_id = validate_account_id(&account_id)?;
    let profile = state.profiles.ingest(account_id, req).await?;
    Ok(Json(IngestResponse::from(&profile)))
}

/// POST /api/v1/profiles/:account_id/upload
///
/// Multipart fields: `display_name`, `email`, `resume` (file), `github_url`,
/// `additional_info`. Collaborator failures (unsupported file, GitHub errors) are returned
/// as-is and nothing is stored.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let account_id = validate_account_id(&account_id)?.to_string();
    let mut req = IngestRequest::default();
    let mut github_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume: {e}")))?;
                if !bytes.is_empty() {
                    let text = extract_resume_text(&file_name, content_type.as_deref(), bytes).await?;
                    req.sources.resume_text = Some(text);
                }
            }
            "display_name" | "email" | "github_url" | "additional_info" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
                match name.as_str() {
                    "display_name" => req.display_name = value,
                    "email" => req.email = value,
                    "github_url" => github_url = Some(value).filter(|v| !v.trim().is_empty()),
                    _ => req.sources.additional_info = Some(value),
                }
            }
            other => tracing::debug!("Ignoring unknown multipart field '{other}'"),
        }
    }

    if let Some(url) = github_url {
        req.sources.github = Some(state.github.fetch(&url).await?);
    }

    let profile = state.profiles.ingest(&account_id, req).await?;
    Ok(Json(IngestResponse::from(&profile)))
}

/// GET /api/v1/profiles/:account_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let account_id = validate_account_id(&account_id)?;
    let profile = state
        .profiles
        .get(account_id)
        .await?
        .ok_or_else(|| MatchError::NotFound(format!("Profile for account '{account_id}'")))?;
    Ok(Json(profile))
}

/// DELETE /api/v1/profiles/:account_id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let account_id = validate_account_id(&account_id)?;
    state.profiles.delete(account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/analytics/skills
pub async fn handle_skill_analytics(
    State(state): State<AppState>,
) -> Result<Json<SkillAnalytics>, AppError> {
    Ok(Json(state.profiles.skill_analytics().await?))
}
