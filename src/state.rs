use sqlx::PgPool;

use crate::config::{AppConfig, FilterConfig};
use crate::storage::UploadStore;

/// Shared per-process state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub filter: FilterConfig,
    pub uploads: UploadStore,
    pub upload_limit: usize,
}

impl AppState {
    pub fn new(pool: PgPool, filter: FilterConfig, uploads: UploadStore, upload_limit: usize) -> Self {
        Self {
            pool,
            filter,
            uploads,
            upload_limit,
        }
    }

    pub fn from_config(pool: PgPool, config: &AppConfig) -> Self {
        Self::new(
            pool,
            config.filter.clone(),
            UploadStore::new(&config.uploads.dir),
            config.uploads.max_bytes,
        )
    }
}
