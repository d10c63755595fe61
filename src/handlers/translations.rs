use axum::extract::{Path, Query, State};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{Translation, TranslationCreate, TranslationUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, TranslationService};
use crate::state::AppState;

use super::{list_params, Exists};

#[derive(Debug, Deserialize)]
pub struct IdentifierCheck {
    pub identifier: String,
}

/// GET /api/translations - identifiers
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let identifiers = TranslationService::new(state.pool).list_identifiers().await?;
    Ok(ApiResponse::success(identifiers))
}

/// GET /api/translations/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Translation>> {
    let params = list_params(&state, query, &[])?;
    let page = TranslationService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/translations/check-unique?identifier=
pub async fn check_unique(State(state): State<AppState>, Query(check): Query<IdentifierCheck>) -> ApiResult<Exists> {
    let exists = TranslationService::new(state.pool).identifier_exists(&check.identifier).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/translations/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Translation> {
    let translation = TranslationService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(translation))
}

/// POST /api/translations
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<TranslationCreate>,
) -> ApiResult<Translation> {
    payload.validate()?;
    let translation = TranslationService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(translation))
}

/// PUT /api/translations/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<TranslationUpdate>,
) -> ApiResult<Translation> {
    payload.validate()?;
    let translation = TranslationService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(translation))
}

/// DELETE /api/translations/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Translation> {
    let translation = TranslationService::new(state.pool).delete(id).await?;
    Ok(ApiResponse::success(translation))
}
