use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    state::AppState,
    teammates::{
        dto::{PageRequest, TeammatesQuery, TeammatesResponse},
        repo_types::TeammateFilter,
    },
};

pub fn teammate_routes() -> Router<AppState> {
    Router::new().route("/teammates", get(list_teammates))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn list_teammates(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<TeammatesQuery>, QueryRejection>,
) -> AppResult<Json<TeammatesResponse>> {
    // Listing never fails on bad input; an undecodable query is an empty one.
    let q = query.map(|Query(q)| q).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring malformed teammates query");
        TeammatesQuery::default()
    });
    let page = PageRequest::parse(q.page.as_deref(), q.limit.as_deref());
    let filter = TeammateFilter::new(q.skill, q.availability);
    let result = state.directory.list(&filter, page).await?;
    Ok(Json(TeammatesResponse {
        success: true,
        teammates: result.items,
        pagination: result.pagination,
    }))
}
