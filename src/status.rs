use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, repo_types::User},
    error::AppResult,
    state::AppState,
    teammates::{dto::PageRequest, repo_types::Teammate, repo_types::TeammateFilter},
};

const SAMPLE_SIZE: u64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub count: usize,
    pub active: Vec<ActiveSession>,
}

#[derive(Debug, Serialize)]
pub struct TeammateSummary {
    pub count: u64,
    pub sample: Vec<Teammate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStatusResponse {
    pub success: bool,
    pub database_connected: bool,
    pub current_user: User,
    pub user_sessions: SessionSummary,
    pub teammates: TeammateSummary,
}

pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/db-status", get(db_status))
}

/// Caller's own record and sessions plus a peek at the directory.
#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn db_status(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DbStatusResponse>> {
    let now = OffsetDateTime::now_utc();
    let active: Vec<ActiveSession> = state
        .auth
        .sessions()
        .list_for_user(auth.user.id)
        .await?
        .into_iter()
        .filter(|s| !s.is_expired_at(now))
        .map(|s| ActiveSession {
            created_at: s.created_at,
            expires_at: s.expires_at,
        })
        .collect();

    let count = state.directory.store().count().await?;
    let sample = state
        .directory
        .list(
            &TeammateFilter::default(),
            PageRequest {
                page: 1,
                limit: SAMPLE_SIZE,
            },
        )
        .await?
        .items;

    Ok(Json(DbStatusResponse {
        success: true,
        database_connected: state.database_connected,
        current_user: auth.user,
        user_sessions: SessionSummary {
            count: active.len(),
            active,
        },
        teammates: TeammateSummary { count, sample },
    }))
}
