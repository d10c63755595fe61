use axum::extract::{Multipart, Path, Query, State};
use validator::Validate;

use crate::database::models::text::default_image_category;
use crate::database::models::{
    AttachmentInput, AttachmentOut, ImageInput, ImageOut, NamedSummary, Project, ProjectCreate, ProjectUpdate,
};
use crate::middleware::{Actor, ApiResponse, ApiResult, AppJson};
use crate::services::{Page, ProjectService};
use crate::state::AppState;

use super::{discard_upload, list_params, read_upload, ImageQuery};

fn upload_dir(id: i64) -> String {
    format!("projects/{}", id)
}

/// GET /api/projects - `{id, name}` in the default language
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<NamedSummary>> {
    let projects = ProjectService::new(state.pool).list_summaries().await?;
    Ok(ApiResponse::success(projects))
}

/// GET /api/projects/full
pub async fn list_full(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Page<Project>> {
    let params = list_params(&state, query, &[])?;
    let page = ProjectService::new(state.pool).list_full(&params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Project> {
    let project = ProjectService::new(state.pool).get(id).await?;
    Ok(ApiResponse::success(project))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(payload): AppJson<ProjectCreate>,
) -> ApiResult<Project> {
    payload.validate()?;
    let project = ProjectService::new(state.pool).create(payload, actor.id()).await?;
    Ok(ApiResponse::created(project))
}

/// PUT /api/projects/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    AppJson(payload): AppJson<ProjectUpdate>,
) -> ApiResult<Project> {
    payload.validate()?;
    let project = ProjectService::new(state.pool).update(id, payload, actor.id()).await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/projects/:id - also removes the project's stored files
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Project> {
    let project = ProjectService::new(state.pool).delete(id).await?;
    if let Err(e) = state.uploads.remove_dir(&upload_dir(id)).await {
        tracing::warn!("Failed to remove upload directory of project {}: {}", id, e);
    }
    Ok(ApiResponse::success(project))
}

/// POST /api/projects/:id/images?category= - multipart `file`
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ImageQuery>,
    actor: Actor,
    multipart: Multipart,
) -> ApiResult<ImageOut> {
    let service = ProjectService::new(state.pool);
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

/// DELETE /api/projects/:id/images/:image_id
pub async fn delete_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i64, i64)>,
) -> ApiResult<ImageOut> {
    let image = ProjectService::new(state.pool).delete_image(id, image_id).await?;
    discard_upload(&state.uploads, &upload_dir(id), &image.image_path).await;
    Ok(ApiResponse::success(image))
}

/// POST /api/projects/:id/attachments - multipart `file`; keeps the client file name
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    actor: Actor,
    multipart: Multipart,
) -> ApiResult<AttachmentOut> {
    let service = ProjectService::new(state.pool);
    service.get(id).await?;

    let upload = read_upload(multipart).await?;
    let stored = state
        .uploads
        .save(&upload_dir(id), upload.file_name.as_deref(), &upload.bytes)
        .await?;
    let attachment = AttachmentInput {
        file_path: stored.path.clone(),
        file_name: stored.file_name,
    };

    match service.add_attachment(id, &attachment, actor.id()).await {
        Ok(attachment) => Ok(ApiResponse::created(attachment)),
        Err(e) => {
            discard_upload(&state.uploads, &upload_dir(id), &stored.path).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/projects/:id/attachments/:attachment_id
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(i64, i64)>,
) -> ApiResult<AttachmentOut> {
    let attachment = ProjectService::new(state.pool).delete_attachment(id, attachment_id).await?;
    discard_upload(&state.uploads, &upload_dir(id), &attachment.file_path).await;
    Ok(ApiResponse::success(attachment))
}
