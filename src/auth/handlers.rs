use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, SignupRequest, UserResponse},
        extractors::AuthUser,
        repo_types::ProfilePatch,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

/// Turn axum's plain-text body rejection into a JSON validation error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "rejected request body");
        AppError::validation(format!("Invalid request body: {}", e.body_text()))
    })
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth.sign_up(json_body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::with_message(user, "Signup successful")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let outcome = state.auth.log_in(json_body(payload)?).await?;
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        user: outcome.user,
        token: outcome.token,
        expires_at: outcome.expires_at,
    }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    state.auth.log_out(&auth.token).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out successfully",
    }))
}

#[instrument(skip(auth), fields(user_id = %auth.user.id))]
pub async fn get_profile(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::new(auth.user))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    let patch = json_body(payload)?;
    let user = state.auth.update_profile(&auth.user, patch).await?;
    Ok(Json(UserResponse::with_message(
        user,
        "Profile updated successfully",
    )))
}
