mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{id_of, TestServer};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

#[sqlx::test(migrations = "./migrations")]
async fn language_image_is_stored_served_and_replaced(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let en = server.language("en", "English", true).await?;

    let (status, language) = server.upload(&format!("/api/languages/{}/image", en), "flag.png", PNG).await?;
    assert_eq!(status, StatusCode::OK, "{}", language);
    let first = language["image"].as_str().unwrap_or_default().to_string();
    assert!(first.starts_with("uploads/language_images/"), "{}", first);
    assert!(first.ends_with(".png"));

    let on_disk = server.upload_root().join(first.trim_start_matches("uploads/"));
    assert_eq!(tokio::fs::read(&on_disk).await?, PNG);

    let served = server.client.get(server.url(&format!("/{}", first))).send().await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), PNG);

    // A new upload replaces the old file.
    let (_, language) = server.upload(&format!("/api/languages/{}/image", en), "flag2.png", PNG).await?;
    let second = language["image"].as_str().unwrap_or_default().to_string();
    assert_ne!(first, second);
    assert!(!on_disk.exists());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn uploads_need_a_file_and_an_owner(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let en = server.language("en", "English", true).await?;

    let (status, _) = server.upload("/api/languages/999/image", "flag.png", PNG).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.upload(&format!("/api/languages/{}/image", en), "empty.png", b"").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Uploaded file is empty");

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let resp = server
        .client
        .post(server.url(&format!("/api/languages/{}/image", en)))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn project_files_follow_their_rows(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let (_, project) = server
        .post("/api/projects", json!({ "repository_url": "https://github.com/example/api" }))
        .await?;
    let id = id_of(&project)?;

    let (status, image) = server
        .upload(&format!("/api/projects/{}/images?category=cover", id), "shot.jpg", PNG)
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", image);
    assert_eq!(image["category"], "cover");
    let image_path = image["image_path"].as_str().unwrap_or_default().to_string();
    assert!(image_path.starts_with(&format!("uploads/projects/{}/", id)), "{}", image_path);

    let (_, gallery) = server.upload(&format!("/api/projects/{}/images", id), "other.jpg", PNG).await?;
    assert_eq!(gallery["category"], "gallery");

    let (status, attachment) = server
        .upload(&format!("/api/projects/{}/attachments", id), "Design Doc.pdf", b"%PDF-1.4")
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", attachment);
    assert_eq!(attachment["file_name"], "Design Doc.pdf");

    let (_, fetched) = server.get(&format!("/api/projects/{}", id)).await?;
    assert_eq!(fetched["images"].as_array().map(Vec::len), Some(2));
    assert_eq!(fetched["attachments"].as_array().map(Vec::len), Some(1));

    // Deleting the image row removes its file.
    let image_file = server.upload_root().join(image_path.trim_start_matches("uploads/"));
    assert!(image_file.exists());
    let (status, _) = server
        .delete(&format!("/api/projects/{}/images/{}", id, id_of(&image)?))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!image_file.exists());

    let (status, body) = server
        .delete(&format!("/api/projects/{}/images/{}", id, id_of(&image)?))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Project image not found");

    // Deleting the project takes the rest of its directory with it.
    let (status, deleted) = server.delete(&format!("/api/projects/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["attachments"].as_array().map(Vec::len), Some(1));
    assert!(!server.upload_root().join(format!("projects/{}", id)).exists());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn portfolio_links_and_images(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let en = server.language("en", "English", true).await?;

    let (_, section) = server
        .post("/api/sections", json!({ "code": "intro", "section_texts": [{ "language_id": en, "text": "Hi" }] }))
        .await?;
    let (_, experience) = server.post("/api/experiences", json!({ "code": "EXP-A", "years": 3 })).await?;
    let (_, project) = server
        .post("/api/projects", json!({ "project_texts": [{ "language_id": en, "name": "Portfolio API" }] }))
        .await?;

    let (status, portfolio) = server
        .post(
            "/api/portfolios",
            json!({
                "name": "Main",
                "description": "Public portfolio",
                "sections": [id_of(&section)?],
                "experiences": [id_of(&experience)?],
                "projects": [id_of(&project)?]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", portfolio);
    let id = id_of(&portfolio)?;
    assert_eq!(portfolio["sections"][0]["code"], "intro");
    assert_eq!(portfolio["experiences"][0]["years"], 3);
    assert_eq!(portfolio["projects"][0]["name"], "Portfolio API");

    let (status, image) = server.upload(&format!("/api/portfolios/{}/images", id), "hero.png", PNG).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", image);
    let image_file = server
        .upload_root()
        .join(image["image_path"].as_str().unwrap_or_default().trim_start_matches("uploads/"));
    assert!(image_file.exists());

    let (_, names) = server.get("/api/portfolios").await?;
    assert_eq!(names, json!(["Main"]));

    let (status, _) = server.delete(&format!("/api/portfolios/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!image_file.exists());
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn deletes_leave_files_owned_by_other_rows(pool: PgPool) -> Result<()> {
    let server = TestServer::start(pool).await?;
    let en = server.language("en", "English", true).await?;

    let (_, language) = server.upload(&format!("/api/languages/{}/image", en), "flag.png", PNG).await?;
    let flag = language["image"].as_str().unwrap_or_default().to_string();
    let flag_file = server.upload_root().join(flag.trim_start_matches("uploads/"));
    assert!(flag_file.exists());

    // Rows that merely point at the flag do not own it.
    let (status, project) = server
        .post(
            "/api/projects",
            json!({
                "images": [{ "image_path": flag, "category": "cover" }],
                "attachments": [{ "file_path": flag, "file_name": "flag.png" }]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", project);
    let project_id = id_of(&project)?;
    let (status, _) = server
        .delete(&format!("/api/projects/{}/images/{}", project_id, id_of(&project["images"][0])?))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.delete(&format!("/api/projects/{}", project_id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(flag_file.exists());

    let (_, portfolio) = server
        .post("/api/portfolios", json!({ "name": "Main", "images": [{ "image_path": flag }] }))
        .await?;
    let (status, _) = server.delete(&format!("/api/portfolios/{}", id_of(&portfolio)?)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(flag_file.exists());

    // A second language sharing the flag keeps it alive until both are gone.
    let (status, fr) = server
        .post("/api/languages", json!({ "code": "fr", "name": "French", "image": flag }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", fr);
    let (status, _) = server.delete(&format!("/api/languages/{}", id_of(&fr)?)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(flag_file.exists());

    let (_, language) = server.get(&format!("/api/languages/{}", en)).await?;
    assert_eq!(language["image"], flag.as_str());
    Ok(())
}
