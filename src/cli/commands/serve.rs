use anyhow::Context;
use tracing::info;

use crate::config::config;
use crate::database::DatabaseManager;
use crate::services::PermissionService;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    info!("Starting Portfolio API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }
    PermissionService::new(pool.clone())
        .seed_core_permissions()
        .await
        .context("failed to seed permissions")?;

    let state = AppState::from_config(pool, config);
    state
        .uploads
        .ensure_dirs()
        .await
        .with_context(|| format!("failed to prepare upload directory {}", config.uploads.dir))?;

    let bind_addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state)).await.context("server error")?;
    Ok(())
}
