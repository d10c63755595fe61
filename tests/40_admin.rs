mod common;

use anyhow::Result;
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use portfolio_api::services::permission_service::CORE_PERMISSIONS;
use portfolio_api::services::PermissionService;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{id_of, TestServer};

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

async fn stored_hash(pool: &PgPool, id: i64) -> Result<String> {
    Ok(sqlx::query_scalar("SELECT hashed_password FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?)
}

#[sqlx::test(migrations = "./migrations")]
async fn core_permissions_seed_once(pool: PgPool) -> Result<()> {
    let service = PermissionService::new(pool.clone());
    assert_eq!(service.seed_core_permissions().await?, CORE_PERMISSIONS.len() as u64);
    assert_eq!(service.seed_core_permissions().await?, 0);

    let server = TestServer::start(pool).await?;
    let (_, names) = server.get("/api/permissions").await?;
    assert_eq!(names.as_array().map(Vec::len), Some(CORE_PERMISSIONS.len()));
    let (_, check) = server.get("/api/permissions/check-unique?name=VIEW_USER").await?;
    assert_eq!(check, json!({ "exists": true }));
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn users_are_created_with_hashed_passwords(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool.clone()).await?;
    let (_, role) = server.post("/api/roles", json!({ "name": "editor" })).await?;
    let role_id = id_of(&role)?;

    let (status, user) = server
        .post(
            "/api/users",
            json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "correct horse",
                "roles": [role_id]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", user);
    assert!(user.get("password").is_none());
    assert!(user.get("hashed_password").is_none());
    assert_eq!(user["is_active"], true);
    assert_eq!(user["roles"][0]["name"], "editor");

    let id = id_of(&user)?;
    let hash = stored_hash(&pool, id).await?;
    assert_ne!(hash, "correct horse");
    assert!(verify_password("correct horse", &hash)?);

    let (status, _) = server
        .put(&format!("/api/users/{}/password", id), json!({ "password": "battery staple" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let hash = stored_hash(&pool, id).await?;
    assert!(verify_password("battery staple", &hash)?);
    assert!(!verify_password("correct horse", &hash)?);

    let (status, _) = server
        .put(&format!("/api/users/{}/password", id), json!({ "password": "short" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn usernames_and_emails_are_unique(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let user = json!({ "username": "ada", "email": "ada@example.com", "password": "long enough" });
    let (status, _) = server.post("/api/users", user).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server
        .post(
            "/api/users",
            json!({ "username": "ada", "email": "other@example.com", "password": "long enough" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already registered");

    let (status, body) = server
        .post(
            "/api/users",
            json!({ "username": "grace", "email": "ada@example.com", "password": "long enough" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let (status, body) = server
        .post(
            "/api/users",
            json!({ "username": "grace", "email": "not-an-email", "password": "long enough" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["email"].is_string(), "{}", body);

    let (_, check) = server.get("/api/users/check-unique?username=ada").await?;
    assert_eq!(check, json!({ "exists": true }));
    let (_, usernames) = server.get("/api/users").await?;
    assert_eq!(usernames, json!(["ada"]));
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn assigned_permissions_cannot_be_deleted(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let (_, permission) = server
        .post("/api/permissions", json!({ "name": "PUBLISH", "description": "Publish portfolios" }))
        .await?;
    let permission_id = id_of(&permission)?;

    let (status, role) = server
        .post("/api/roles", json!({ "name": "publisher", "permissions": [permission_id] }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", role);
    assert_eq!(role["permissions"][0]["name"], "PUBLISH");
    let role_id = id_of(&role)?;

    let (status, body) = server.delete(&format!("/api/permissions/{}", permission_id)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cannot delete permission as it is assigned to roles");

    let (status, _) = server.put(&format!("/api/roles/{}", role_id), json!({ "permissions": [] })).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = server.delete(&format!("/api/permissions/{}", permission_id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "PUBLISH");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn role_names_are_unique(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let (status, _) = server.post("/api/roles", json!({ "name": "admin" })).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server.post("/api/roles", json!({ "name": "admin" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Role already exists");

    let (_, check) = server.get("/api/roles/check-unique?name=admin").await?;
    assert_eq!(check["exists"], true);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn acting_user_is_recorded(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;

    let resp = server
        .client
        .post(server.url("/api/roles"))
        .header("x-user-id", "42")
        .json(&json!({ "name": "audited" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let role: serde_json::Value = resp.json().await?;
    assert_eq!(role["created_by"], 42);
    assert_eq!(role["updated_by"], 42);

    let (_, anonymous) = server.post("/api/roles", json!({ "name": "anonymous" })).await?;
    assert!(anonymous["created_by"].is_null());
    Ok(())
}
