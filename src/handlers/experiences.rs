use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::database::models::{Experience, ExperienceCreate, ExperienceUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{ExperienceService, Page};
use crate::state::AppState;

use super::{list_params, Exists};

/// GET /api/experiences - experience codes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let codes = ExperienceService::new(state.pool).list_codes().await?;
    Ok(ApiResponse::success(codes))
}

/// GET /api/experiences/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Experience>> {
    let params = list_params(&state, query, &[])?;
    let page = ExperienceService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/experiences/check-code/:code
pub async fn check_code(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Exists> {
    let exists = ExperienceService::new(state.pool).code_exists(&code).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/experiences/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Experience> {
    let experience = ExperienceService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(experience))
}

/// POST /api/experiences
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<ExperienceCreate>,
) -> ApiResult<Experience> {
    payload.validate()?;
    let experience = ExperienceService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(experience))
}

/// PUT /api/experiences/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<ExperienceUpdate>,
) -> ApiResult<Experience> {
    payload.validate()?;
    let experience = ExperienceService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(experience))
}

/// DELETE /api/experiences/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Experience> {
    let experience = ExperienceService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(experience))
}
