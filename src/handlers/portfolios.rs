use axum::extract::{Multipart, Path, Query, State};
use validator::Validate;

use crate::database::models::text::default_image_category;
use crate::database::models::{ImageInput, ImageOut, Portfolio, PortfolioCreate, PortfolioUpdate};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, PortfolioService};
use crate::state::AppState;

use super::{discard_upload, list_params, read_upload, ImageQuery};

fn upload_dir(id: i64) -> String {
    format!("portfolios/{}", id)
}

/// GET /api/portfolios - names
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let names = PortfolioService::new(state.pool).list_names().await?;
    Ok(ApiResponse::success(names))
}

/// GET /api/portfolios/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Portfolio>> {
    let params = list_params(&state, query, &[])?;
    let page = PortfolioService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/portfolios/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Portfolio> {
    let portfolio = PortfolioService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(portfolio))
}

/// POST /api/portfolios
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<PortfolioCreate>,
) -> ApiResult<Portfolio> {
    payload.validate()?;
    let portfolio = PortfolioService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(portfolio))
}

/// PUT /api/portfolios/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<PortfolioUpdate>,
) -> ApiResult<Portfolio> {
    payload.validate()?;
    let portfolio = PortfolioService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(portfolio))
}

/// DELETE /api/portfolios/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Portfolio> {
    let portfolio = PortfolioService::new(state.pool).delete(id).await?;
    if let Err(e) = state.uploads.remove_dir(&upload_dir(id)).await {
        tracing::warn!("Failed to remove upload directory of portfolio {}: {}", id, e);
    }
    Ok(ApiResponse::success(portfolio))
}

/// POST /api/portfolios/:id/images?category= - multipart `file`
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ImageQuery>,
    actor: Actor,
    multipart: Multipart,
) -> ApiResult<ImageOut> {
    let service = PortfolioService::new(state.pool);
    service.get(id).await?;

    let upload = read_upload(multipart).await?;
    let stored = state
        .uploads
        .save(&upload_dir(id), upload.file_name.as_deref(), &upload.bytes)
        .await?;
    let image = ImageInput {
        image_path: stored.path.clone(),
        category: query.category.unwrap_or_else(default_image_category),
    };

    match service.add_image(id, &image, actor.id()).await {
        Ok(image) => Ok(ApiResponse::created(image)),
        Err(e) => {
            discard_upload(&state.uploads, &upload_dir(id), &stored.path).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/portfolios/:id/images/:image_id
pub async fn delete_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i64, i64)>,
) -> ApiResult<ImageOut> {
    let image = PortfolioService::new(state.pool).delete_image(id, image_id).await?;
    discard_upload(&state.uploads, &upload_dir(id), &image.image_path).await;
    Ok(ApiResponse::success(image))
}
