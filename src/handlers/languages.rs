use axum::extract::{Multipart, Path, Query, State};
use validator::Validate;

use crate::database::models::{Language, LanguageCreate, LanguageUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{LanguageService, Page};
use crate::state::AppState;
use crate::storage::UploadStore;

use super::{discard_upload, list_params, read_upload, Exists};

const IMAGE_DIR: &str = "language_images";

/// GET /api/languages - language codes, default first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let codes = LanguageService::new(state.pool).list_codes().await?;
    Ok(ApiResponse::success(codes))
}

/// GET /api/languages/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Language>> {
    let params = list_params(&state, query, &[])?;
    let page = LanguageService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/languages/default
pub async fn get_default(State(state): State<AppState>) -> ApiResult<Option<Language>> {
    let language = LanguageService::new(state.pool).get_default().await?;
    Ok(ApiResponse::success(language))
}

/// GET /api/languages/check-code/:code
pub async fn check_code(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Exists> {
    let exists = LanguageService::new(state.pool).code_exists(&code).await?;
    Ok(ApiResponse::success(Exists { exists }))
}

/// GET /api/languages/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Language> {
    let language = LanguageService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(language))
}

/// POST /api/languages
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<LanguageCreate>,
) -> ApiResult<Language> {
    payload.validate()?;
    let language = LanguageService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(language))
}

/// PUT /api/languages/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<LanguageUpdate>,
) -> ApiResult<Language> {
    payload.validate()?;
    let language = LanguageService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(language))
}

/// DELETE /api/languages/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Language> {
    let service = LanguageService::new(state.pool);
    let language = service.delete(id).await?;
    if let Some(image) = &language.image {
        release_image(&service, &state.uploads, image).await;
    }
    Ok(ApiResponse::success(language))
}

/// POST /api/languages/:id/image - multipart `file`; replaces the previous image
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    multipart: Multipart,
) -> ApiResult<Language> {
    let service = LanguageService::new(state.pool);
    service.get(id).await?;

    let upload = read_upload(multipart).await?;
    let stored = state
        .uploads
        .save(IMAGE_DIR, upload.file_name.as_deref(), &upload.bytes)
        .await?;

    let (language, previous) = match service.set_image(id, &stored.path, actor.id()).await {
        Ok(result) => result,
        Err(e) => {
            discard_upload(&state.uploads, IMAGE_DIR, &stored.path).await;
            return Err(e.into());
        }
    };
    if let Some(previous) = previous.filter(|p| *p != stored.path) {
        release_image(&service, &state.uploads, &previous).await;
    }
    Ok(ApiResponse::success(language))
}

/// Language images share one directory, so a file is only removed once no
/// language references it.
async fn release_image(service: &LanguageService, store: &UploadStore, path: &str) {
    match service.image_in_use(path).await {
        Ok(false) => discard_upload(store, IMAGE_DIR, path).await,
        Ok(true) => tracing::debug!("Keeping {}: still referenced by a language", path),
        Err(e) => tracing::warn!("Could not check references to {}: {}", path, e),
    }
}
