use anyhow::Context;
use tracing::info;

use crate::config::config;
use crate::database::DatabaseManager;
use crate::services::PermissionService;

pub async fn migrate() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    Ok(())
}

pub async fn seed_permissions() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to database")?;
    let inserted = PermissionService::new(pool)
        .seed_core_permissions()
        .await
        .context("failed to seed permissions")?;
    info!("Seeded {} core permissions", inserted);
    Ok(())
}
