use axum::extract::{Path, Query, State};
use serde::Deserialize;
use validator::Validate;

use crate::auth::hash_password;
use crate::database::models::{PasswordChange, User, UserCreate, UserUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, UserService};
use crate::state::AppState;

use super::{list_params, Exists};

#[derive(Debug, Deserialize)]
pub struct UsernameCheck {
    pub username: String,
}

/// GET /api/users - usernames
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let usernames = UserService::new(state.pool).list_usernames().await?;
    Ok(ApiResponse::success(usernames))
}

/// GET /api/users/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<User>> {
    let params = list_params(&state, query, &[])?;
    let page = UserService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/users/check-unique?username=
pub async fn check_unique(State(state): State<AppState>, Query(check): Query<UsernameCheck>) -> ApiResult<Exists> {
    let exists = UserService::new(state.pool).username_exists(&check.username).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    let user = UserService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users - the password is hashed before it reaches the database
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<UserCreate>,
) -> ApiResult<User> {
    payload.validate()?;
    let hashed = hash_password(&payload.password)?;
    let user = UserService::new(state.pool).create(&payload, &hashed, actor.id()).await?;
    Ok(ApiResponse::created(user))
}

/// PUT /api/users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<UserUpdate>,
) -> ApiResult<User> {
    payload.validate()?;
    let user = UserService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id/password
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<PasswordChange>,
) -> ApiResult<User> {
    payload.validate()?;
    let hashed = hash_password(&payload.password)?;
    let user = UserService::new(state.pool).set_password(id, &hashed, actor.id()).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    let user = UserService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(user))
}
