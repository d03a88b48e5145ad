//! Login, member registration and profile

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use shared::error::{ApiResponse, AppError};
use shared::models::{AuthSession, LoginRequest, RegisterMember, UserProfile};

use super::{ApiResult, ok, ok_with};
use crate::auth::CurrentUser;
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::services::accounts;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let login_routes = Router::new()
        .route("/login", post(login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));
    let register_routes = Router::new()
        .route("/register-member", post(register_member))
        .route_layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));
    let profile_routes = Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state, crate::auth::require_auth));

    Router::new()
        .merge(login_routes)
        .merge(register_routes)
        .merge(profile_routes)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthSession> {
    let session = accounts::login(&state.pool, &state.jwt, &req).await?;
    ok_with("Login successful", session)
}

/// POST /api/auth/register-member
pub async fn register_member(
    State(state): State<AppState>,
    Json(req): Json<RegisterMember>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), AppError> {
    let now = shared::util::now_millis();
    let session = accounts::register_member(&state.pool, &state.jwt, &req, now).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message("Member registered successfully", session)),
    ))
}

/// GET /api/auth/profile
pub async fn profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<UserProfile> {
    ok(accounts::profile(&state.pool, user.id, user.role).await?)
}
