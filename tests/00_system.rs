mod common;

use anyhow::Result;
use reqwest::StatusCode;
use sqlx::PgPool;

use common::TestServer;

#[sqlx::test(migrations = "./migrations")]
async fn root_and_health_respond(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;

    let (status, body) = server.get("/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Portfolio API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn collection_routes_accept_a_trailing_slash(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;

    for path in ["/api/languages", "/api/languages/", "/api/roles/", "/api/category-types/"] {
        let (status, body) = server.get(path).await?;
        assert_eq!(status, StatusCode::OK, "{}", path);
        assert!(body.is_array(), "{} -> {}", path, body);
    }
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn malformed_json_is_a_bad_request(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;

    let resp = server
        .client
        .post(server.url("/api/languages"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
