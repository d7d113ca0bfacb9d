use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            CheckCodeRequest, LoginRequest, LoginResponse, PublicUser, ResetRequest,
            SignupRequest, SignupResponse, StatusResponse, UpdatePasswordRequest,
            UpdateUserRequest,
        },
        jwt::{AdminUser, AuthUser},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/users", post(create_user).get(list_users))
        .route("/users/password", post(update_user_password))
        .route("/users/reset", post(reset_user))
        .route("/users/check-code", post(check_verification_code))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let created = state.auth.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    Ok(Json(state.auth.login(payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(state.auth.delete_user(id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user_password(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(state.auth.update_password(payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.auth.update_user(id, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn reset_user(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(state.auth.request_reset(payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn check_verification_code(
    State(state): State<AppState>,
    Json(payload): Json<CheckCodeRequest>,
) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(state.auth.check_code(payload).await?))
}

/// A user may read their own record; admins may read any.
#[instrument(skip(state, caller))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicUser>> {
    if caller.id != id && !caller.is_admin {
        warn!(caller_id = %caller.id, user_id = %id, "user read refused");
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.auth.get_user(id).await?))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    Ok(Json(state.auth.list_users().await?))
}

#[instrument(skip_all)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.auth.get_user(claims.id).await?))
}
