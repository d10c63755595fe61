use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::database::models::{Permission, PermissionCreate, PermissionUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, PermissionService};
use crate::state::AppState;

use super::{list_params, Exists, NameQuery};

/// GET /api/permissions - names
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let names = PermissionService::new(state.pool).list_names().await?;
    Ok(ApiResponse::success(names))
}

/// GET /api/permissions/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Permission>> {
    let params = list_params(&state, query, &[])?;
    let page = PermissionService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/permissions/check-unique?name=
pub async fn check_unique(State(state): State<AppState>, Query(check): Query<NameQuery>) -> ApiResult<Exists> {
    let exists = PermissionService::new(state.pool).name_exists(&check.name).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/permissions/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Permission> {
    let permission = PermissionService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(permission))
}

/// POST /api/permissions
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<PermissionCreate>,
) -> ApiResult<Permission> {
    payload.validate()?;
    let permission = PermissionService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(permission))
}

/// PUT /api/permissions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<PermissionUpdate>,
) -> ApiResult<Permission> {
    payload.validate()?;
    let permission = PermissionService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(permission))
}

/// DELETE /api/permissions/:id - refused while a role still holds the permission
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Permission> {
    let permission = PermissionService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(permission))
}
