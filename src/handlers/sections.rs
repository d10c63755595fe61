use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::database::models::{Section, SectionCreate, SectionUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, SectionService};
use crate::state::AppState;

use super::{list_params, Exists};

/// GET /api/sections - section codes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let codes = SectionService::new(state.pool).list_codes().await?;
    Ok(ApiResponse::success(codes))
}

/// GET /api/sections/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Section>> {
    let params = list_params(&state, query, &[])?;
    let page = SectionService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/sections/check-code/:code
pub async fn check_code(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Exists> {
    let exists = SectionService::new(state.pool).code_exists(&code).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/sections/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Section> {
    let section = SectionService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(section))
}

/// POST /api/sections
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<SectionCreate>,
) -> ApiResult<Section> {
    payload.validate()?;
    let section = SectionService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(section))
}

/// PUT /api/sections/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<SectionUpdate>,
) -> ApiResult<Section> {
    payload.validate()?;
    let section = SectionService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(section))
}

/// DELETE /api/sections/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Section> {
    let section = SectionService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(section))
}
