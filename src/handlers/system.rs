use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Portfolio API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Backend for a multilingual portfolio CMS",
        "endpoints": {
            "health": "/health",
            "api": "/api/{languages,translations,sections,experiences,categories,category-types,skills,projects,portfolios,users,roles,permissions}",
            "uploads": "/uploads/*",
        }
    }))
}

/// GET /health - 503 when the database does not answer
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
