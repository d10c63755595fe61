use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{Section, SectionCreate, SectionUpdate};
use crate::database::texts::{replace_texts, texts_json};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::fields::{SECTIONS, SECTION_TEXTS};
use crate::filter::ListParams;

use super::{fetch_one, fetch_ordered, value_taken, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"code\", {} AS \"section_texts\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"sections\" t",
        texts_json(&SECTION_TEXTS, &["text"], "t.\"id\"")
    )
});

const CODE_TAKEN: &str = "The section with this code already exists in the system.";

pub struct SectionService {
    pool: PgPool,
}

impl SectionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_codes(&self) -> Result<Vec<String>, DatabaseError> {
        let codes = sqlx::query_scalar("SELECT \"code\" FROM \"sections\" ORDER BY \"code\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(codes)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Section>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&SECTIONS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Section, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Section not found".to_string()))
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "sections", "code", code, None).await
    }

    pub async fn create(&self, input: SectionCreate, actor: Option<i64>) -> Result<Section, DatabaseError> {
        if self.code_exists(&input.code).await? {
            return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"sections\" (\"code\", \"created_by\", \"updated_by\") VALUES ($1, $2, $2) RETURNING \"id\"",
        )
        .bind(&input.code)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_texts(&mut tx, &SECTION_TEXTS, id, &input.section_texts, actor).await?;
        tx.commit().await?;

        info!("Created section {} ({})", input.code, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: SectionUpdate, actor: Option<i64>) -> Result<Section, DatabaseError> {
        self.get(id).await?;
        if let Some(code) = &input.code {
            if value_taken(&self.pool, "sections", "code", code, Some(id)).await? {
                return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"sections\" SET \"code\" = COALESCE($2, \"code\"), \"updated_at\" = now(), \"updated_by\" = $3 \
             WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.code)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(texts) = &input.section_texts {
            replace_texts(&mut tx, &SECTION_TEXTS, id, texts, actor).await?;
        }
        tx.commit().await?;

        debug!("Updated section {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Section, DatabaseError> {
        let section = self.get(id).await?;
        sqlx::query("DELETE FROM \"sections\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted section {} ({})", section.code, id);
        Ok(section)
    }
}
