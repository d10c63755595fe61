pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod storage;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put, MethodRouter};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::AppState;

/// Full HTTP surface: `/`, `/health`, `/api/*` and the static `/uploads` tree.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads.root());
    let body_limit = state.upload_limit;

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Content
        .merge(language_routes())
        .merge(translation_routes())
        .merge(section_routes())
        .merge(experience_routes())
        .merge(category_routes())
        .merge(category_type_routes())
        .merge(skill_routes())
        .merge(project_routes())
        .merge(portfolio_routes())
        // Administration
        .merge(user_routes())
        .merge(role_routes())
        .merge(permission_routes())
        .nest_service("/uploads", uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config::config().server.cors_origins)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Registers the collection route with and without the trailing slash.
fn collection(base: &str, router: Router<AppState>, methods: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(base, methods.clone())
        .route(&format!("{}/", base), methods)
}

fn language_routes() -> Router<AppState> {
    collection(
        "/api/languages",
        Router::new(),
        get(languages::list).post(languages::create),
    )
    .route("/api/languages/full", get(languages::list_full))
    .route("/api/languages/default", get(languages::get_default))
    .route("/api/languages/check-code/:code", get(languages::check_code))
    .route(
        "/api/languages/:id",
        get(languages::get).put(languages::update).delete(languages::delete),
    )
    .route("/api/languages/:id/image", post(languages::upload_image))
}

fn translation_routes() -> Router<AppState> {
    collection(
        "/api/translations",
        Router::new(),
        get(translations::list).post(translations::create),
    )
    .route("/api/translations/full", get(translations::list_full))
    .route("/api/translations/check-unique", get(translations::check_unique))
    .route(
        "/api/translations/:id",
        get(translations::get).put(translations::update).delete(translations::delete),
    )
}

fn section_routes() -> Router<AppState> {
    collection("/api/sections", Router::new(), get(sections::list).post(sections::create))
        .route("/api/sections/full", get(sections::list_full))
        .route("/api/sections/check-code/:code", get(sections::check_code))
        .route(
            "/api/sections/:id",
            get(sections::get).put(sections::update).delete(sections::delete),
        )
}

fn experience_routes() -> Router<AppState> {
    collection(
        "/api/experiences",
        Router::new(),
        get(experiences::list).post(experiences::create),
    )
    .route("/api/experiences/full", get(experiences::list_full))
    .route("/api/experiences/check-code/:code", get(experiences::check_code))
    .route(
        "/api/experiences/:id",
        get(experiences::get).put(experiences::update).delete(experiences::delete),
    )
}

fn category_routes() -> Router<AppState> {
    collection(
        "/api/categories",
        Router::new(),
        get(categories::list).post(categories::create),
    )
    .route("/api/categories/full", get(categories::list_full))
    .route("/api/categories/by-type/:type", get(categories::list_by_type))
    .route("/api/categories/check-code/:code", get(categories::check_code))
    .route(
        "/api/categories/:id",
        get(categories::get).put(categories::update).delete(categories::delete),
    )
}

fn category_type_routes() -> Router<AppState> {
    collection(
        "/api/category-types",
        Router::new(),
        get(category_types::list).post(category_types::create),
    )
    .route("/api/category-types/full", get(category_types::list_full))
    .route("/api/category-types/check-code/:code", get(category_types::check_code))
    .route(
        "/api/category-types/:code",
        get(category_types::get)
            .put(category_types::update)
            .delete(category_types::delete),
    )
}

fn skill_routes() -> Router<AppState> {
    collection("/api/skills", Router::new(), get(skills::list).post(skills::create))
        .route("/api/skills/full", get(skills::list_full))
        .route("/api/skills/by-type/:type", get(skills::list_by_type))
        .route("/api/skills/check-unique", get(skills::check_unique))
        .route("/api/skills/:id", get(skills::get).put(skills::update).delete(skills::delete))
}

fn project_routes() -> Router<AppState> {
    use axum::routing::delete;

    collection("/api/projects", Router::new(), get(projects::list).post(projects::create))
        .route("/api/projects/full", get(projects::list_full))
        .route(
            "/api/projects/:id",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
        .route("/api/projects/:id/images", post(projects::upload_image))
        .route("/api/projects/:id/images/:image_id", delete(projects::delete_image))
        .route("/api/projects/:id/attachments", post(projects::upload_attachment))
        .route(
            "/api/projects/:id/attachments/:attachment_id",
            delete(projects::delete_attachment),
        )
}

fn portfolio_routes() -> Router<AppState> {
    use axum::routing::delete;

    collection(
        "/api/portfolios",
        Router::new(),
        get(portfolios::list).post(portfolios::create),
    )
    .route("/api/portfolios/full", get(portfolios::list_full))
    .route(
        "/api/portfolios/:id",
        get(portfolios::get).put(portfolios::update).delete(portfolios::delete),
    )
    .route("/api/portfolios/:id/images", post(portfolios::upload_image))
    .route("/api/portfolios/:id/images/:image_id", delete(portfolios::delete_image))
}

fn user_routes() -> Router<AppState> {
    collection("/api/users", Router::new(), get(users::list).post(users::create))
        .route("/api/users/full", get(users::list_full))
        .route("/api/users/check-unique", get(users::check_unique))
        .route("/api/users/:id", get(users::get).put(users::update).delete(users::delete))
        .route("/api/users/:id/password", put(users::change_password))
}

fn role_routes() -> Router<AppState> {
    collection("/api/roles", Router::new(), get(roles::list).post(roles::create))
        .route("/api/roles/full", get(roles::list_full))
        .route("/api/roles/check-unique", get(roles::check_unique))
        .route("/api/roles/:id", get(roles::get).put(roles::update).delete(roles::delete))
}

fn permission_routes() -> Router<AppState> {
    collection(
        "/api/permissions",
        Router::new(),
        get(permissions::list).post(permissions::create),
    )
    .route("/api/permissions/full", get(permissions::list_full))
    .route("/api/permissions/check-unique", get(permissions::check_unique))
    .route(
        "/api/permissions/:id",
        get(permissions::get).put(permissions::update).delete(permissions::delete),
    )
}

/// Explicit origins from configuration; an empty list or `*` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn allowed_origin(layer: CorsLayer, origin: &str) -> Option<HeaderValue> {
        let app: Router = Router::new().route("/", get(|| async { "ok" })).layer(layer);
        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).cloned()
    }

    #[tokio::test]
    async fn wildcard_or_empty_origins_allow_anyone() {
        for origins in [vec!["*".to_string()], vec![]] {
            let allowed = allowed_origin(cors_layer(&origins), "https://anywhere.example").await;
            assert_eq!(allowed, Some(HeaderValue::from_static("*")), "{:?}", origins);
        }
    }

    #[tokio::test]
    async fn explicit_origins_skip_invalid_entries() {
        let origins = ["http://localhost:5173".to_string(), "bad\norigin".to_string()];

        let allowed = allowed_origin(cors_layer(&origins), "http://localhost:5173").await;
        assert_eq!(allowed, Some(HeaderValue::from_static("http://localhost:5173")));

        let denied = allowed_origin(cors_layer(&origins), "https://elsewhere.example").await;
        assert_eq!(denied, None);
    }
}
