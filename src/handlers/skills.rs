use axum::extract::{Path, Query, State};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{NamedSummary, Skill, SkillCreate, SkillNameCheck, SkillUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, SkillService};
use crate::state::AppState;

use super::list_params;

/// `?type=` and `?name=` act as `contains` filters on `/full`.
const SHORTCUTS: &[&str] = &["type", "name"];

#[derive(Debug, Deserialize)]
pub struct NameCheck {
    pub name: String,
    pub language_id: i64,
    /// Skill being edited, ignored by the check.
    pub exclude_id: Option<i64>,
}

/// GET /api/skills - `{id, name}` in the default language
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<NamedSummary>> {
    let skills = SkillService::new(state.pool).list_summaries().await?;
    Ok(ApiResponse::success(skills))
}

/// GET /api/skills/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Skill>> {
    let params = list_params(&state, query, SHORTCUTS)?;
    let page = SkillService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/skills/by-type/:type
pub async fn list_by_type(State(state): State<AppState>, Path(kind): Path<String>) -> ApiResult<Vec<Skill>> {
    let skills = SkillService::new(state.pool).list_by_type(&kind).await?;
    Ok(ApiResponse::success(skills))
}

/// GET /api/skills/check-unique?name=&language_id=[&exclude_id=]
pub async fn check_unique(State(state): State<AppState>, Query(check): Query<NameCheck>) -> ApiResult<SkillNameCheck> {
    let result = SkillService::new(state.pool)
        .check_name(&check.name, check.language_id, check.exclude_id)
        .await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/skills/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Skill> {
    let skill = SkillService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(skill))
}

/// POST /api/skills
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<SkillCreate>,
) -> ApiResult<Skill> {
    payload.validate()?;
    let skill = SkillService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(skill))
}

/// PUT /api/skills/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<SkillUpdate>,
) -> ApiResult<Skill> {
    payload.validate()?;
    let skill = SkillService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(skill))
}

/// DELETE /api/skills/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Skill> {
    let skill = SkillService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(skill))
}
