use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::database::models::{Role, RoleCreate, RoleUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, RoleService};
use crate::state::AppState;

use super::{list_params, Exists, NameQuery};

/// GET /api/roles - names
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let names = RoleService::new(state.pool).list_names().await?;
    Ok(ApiResponse::success(names))
}

/// GET /api/roles/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Role>> {
    let params = list_params(&state, query, &[])?;
    let page = RoleService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/roles/check-unique?name=
pub async fn check_unique(State(state): State<AppState>, Query(check): Query<NameQuery>) -> ApiResult<Exists> {
    let exists = RoleService::new(state.pool).name_exists(&check.name).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/roles/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Role> {
    let role = RoleService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(role))
}

/// POST /api/roles
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<RoleCreate>,
) -> ApiResult<Role> {
    payload.validate()?;
    let role = RoleService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(role))
}

/// PUT /api/roles/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<RoleUpdate>,
) -> ApiResult<Role> {
    payload.validate()?;
    let role = RoleService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(role))
}

/// DELETE /api/roles/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Role> {
    let role = RoleService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(role))
}
