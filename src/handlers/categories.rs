use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::database::models::{Category, CategoryCreate, CategoryUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{CategoryService, Page};
use crate::state::AppState;

use super::{list_params, Exists};

/// GET /api/categories - category codes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let codes = CategoryService::new(state.pool).list_codes().await?;
    Ok(ApiResponse::success(codes))
}

/// GET /api/categories/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Category>> {
    let params = list_params(&state, query, &[])?;
    let page = CategoryService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/categories/by-type/:type
pub async fn list_by_type(State(state): State<AppState>, Path(kind): Path<String>) -> ApiResult<Vec<Category>> {
    let categories = CategoryService::new(state.pool).list_by_type(&kind).await?;
    Ok(ApiResponse::success(categories))
}

/// GET /api/categories/check-code/:code
pub async fn check_code(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Exists> {
    let exists = CategoryService::new(state.pool).code_exists(&code).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/categories/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Category> {
    let category = CategoryService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(category))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<CategoryCreate>,
) -> ApiResult<Category> {
    payload.validate()?;
    let category = CategoryService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(category))
}

/// PUT /api/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<CategoryUpdate>,
) -> ApiResult<Category> {
    payload.validate()?;
    let category = CategoryService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/categories/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Category> {
    let category = CategoryService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(category))
}
