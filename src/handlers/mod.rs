//! HTTP handlers, one module per resource under `/api`.
//!
//! Every handler is thin: extract, validate, call the entity service, wrap the
//! result. Routing lives in `crate::app`.

use axum::extract::Multipart;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::filter::{ListParams, ListQuery};
use crate::state::AppState;
use crate::storage::{UploadStore, PUBLIC_PREFIX};

pub mod categories;
pub mod category_types;
pub mod experiences;
pub mod languages;
pub mod permissions;
pub mod portfolios;
pub mod projects;
pub mod roles;
pub mod sections;
pub mod skills;
pub mod system;
pub mod translations;
pub mod users;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// `/full` query string into validated listing parameters.
pub(crate) fn list_params(state: &AppState, pairs: Vec<(String, String)>, shortcuts: &[&str]) -> Result<ListParams, ApiError> {
    let params = ListQuery::from(pairs).into_params(&state.filter, shortcuts)?;
    Ok(params)
}

/// Body of the `check-code` and `check-unique` endpoints.
#[derive(Debug, Serialize)]
pub struct Exists {
    pub exists: bool,
}

/// `?name=` of the roles and permissions `check-unique` endpoints.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ImageQuery {
    pub category: Option<String>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the `file` field of a multipart body; other fields are skipped.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(UploadedFile {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::bad_request("No file uploaded; expected multipart field 'file'"))
}

/// Best-effort removal of a stored upload after its row is gone. Only files
/// stored under `owner_dir` are removed; stored paths are client-writable and
/// may point at files another row owns.
pub(crate) async fn discard_upload(store: &UploadStore, owner_dir: &str, path: &str) {
    if !path.starts_with(&format!("{}/{}/", PUBLIC_PREFIX, owner_dir)) {
        tracing::debug!("Keeping {}: not stored under {}", path, owner_dir);
        return;
    }
    if let Err(e) = store.remove(path).await {
        tracing::warn!("Failed to remove upload {}: {}", path, e);
    }
}
