pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::profile::handlers as profiles;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/api/v1/profiles/:account_id",
            put(profiles::handle_ingest)
                .get(profiles::handle_get_profile)
                .delete(profiles::handle_delete_profile),
        )
        .route(
            "/api/v1/profiles/:account_id/upload",
            post(profiles::handle_upload),
        )
        // Search and chat
        .route("/api/v1/search", post(search::handle_search))
        .route("/api/v1/chat", post(search::handle_chat))
        .route("/api/v1/match", post(search::handle_match))
        .route("/api/v1/analytics/skills", get(profiles::handle_skill_analytics))
        .with_state(state)
}
