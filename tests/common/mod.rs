#![allow(dead_code)]

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use portfolio_api::config::FilterConfig;
use portfolio_api::state::AppState;
use portfolio_api::storage::UploadStore;
use reqwest::StatusCode;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;

const UPLOAD_LIMIT: usize = 1024 * 1024;

/// The real router served in-process on a free port, over a per-test database
/// and a throwaway upload directory.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    uploads: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start(pool: PgPool) -> Result<Self> {
        Self::start_with(pool, FilterConfig::default()).await
    }

    pub async fn start_with(pool: PgPool, filter: FilterConfig) -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let store = UploadStore::new(uploads.path());
        store.ensure_dirs().await?;
        let state = AppState::new(pool, filter, store, UPLOAD_LIMIT);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, portfolio_api::app(state)).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            uploads,
            handle,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn upload_root(&self) -> &Path {
        self.uploads.path()
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        read(self.client.get(self.url(path)).send().await?).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        read(self.client.post(self.url(path)).json(&body).send().await?).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        read(self.client.put(self.url(path)).json(&body).send().await?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        read(self.client.delete(self.url(path)).send().await?).await
    }

    /// Multipart upload with the file in the `file` field.
    pub async fn upload(&self, path: &str, file_name: &str, bytes: &[u8]) -> Result<(StatusCode, Value)> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        read(self.client.post(self.url(path)).multipart(form).send().await?).await
    }

    /// Create a language and return its id.
    pub async fn language(&self, code: &str, name: &str, is_default: bool) -> Result<i64> {
        let (status, body) = self
            .post(
                "/api/languages",
                serde_json::json!({ "code": code, "name": name, "is_default": is_default }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "language create failed: {} {}", status, body);
        id_of(&body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(resp: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = resp.status();
    let text = resp.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("non-JSON body ({}): {}", status, text))?
    };
    Ok((status, body))
}

pub fn id_of(body: &Value) -> Result<i64> {
    body["id"].as_i64().with_context(|| format!("response has no id: {}", body))
}

pub fn ids_of(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["id"].as_i64()).collect())
        .unwrap_or_default()
}
