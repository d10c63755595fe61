use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::database::models::{CategoryType, CategoryTypeCreate, CategoryTypeUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{CategoryTypeService, Page};
use crate::state::AppState;

use super::{list_params, Exists};

/// `?code=` and `?name=` act as `contains` filters on `/full`.
const SHORTCUTS: &[&str] = &["code", "name"];

/// GET /api/category-types - codes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let codes = CategoryTypeService::new(state.pool).list_codes().await?;
    Ok(ApiResponse::success(codes))
}

/// GET /api/category-types/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<CategoryType>> {
    let params = list_params(&state, query, SHORTCUTS)?;
    let page = CategoryTypeService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/category-types/check-code/:code
pub async fn check_code(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Exists> {
    let exists = CategoryTypeService::new(state.pool).code_exists(&code).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/category-types/:code
pub async fn get(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<CategoryType> {
    let category_type = CategoryTypeService::new(state.pool).get(&code).await?;
    Ok(ApiResponse::success(category_type))
}

/// POST /api/category-types
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<CategoryTypeCreate>,
) -> ApiResult<CategoryType> {
    payload.validate()?;
    let category_type = CategoryTypeService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(category_type))
}

/// PUT /api/category-types/:code
pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<String>,
    actor: Actor,
    AppJson(payload): AppJson<CategoryTypeUpdate>,
) -> ApiResult<CategoryType> {
    payload.validate()?;
    let category_type = CategoryTypeService::new(state.pool).update(&code, payload, actor.id()).await?;
    Ok(ApiResponse::success(category_type))
}

/// DELETE /api/category-types/:code
pub async fn delete(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<CategoryType> {
    let category_type = CategoryTypeService::new(state.pool).delete(&code).await?;
    Ok(ApiResponse::success(category_type))
}
