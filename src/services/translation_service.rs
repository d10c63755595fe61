use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{Translation, TranslationCreate, TranslationUpdate};
use crate::database::relations::{links_json, replace_links, TRANSLATION_LANGUAGES};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::TRANSLATIONS, ListParams};

use super::{fetch_one, fetch_ordered, value_taken, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"identifier\", t.\"text\", {} AS \"languages\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"translations\" t",
        links_json(
            &TRANSLATION_LANGUAGES,
            "t.\"id\"",
            &[("id", "o.\"id\""), ("code", "o.\"code\""), ("name", "o.\"name\"")],
        )
    )
});

const IDENTIFIER_TAKEN: &str = "The translation with this identifier already exists in the system.";

pub struct TranslationService {
    pool: PgPool,
}

impl TranslationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_identifiers(&self) -> Result<Vec<String>, DatabaseError> {
        let identifiers = sqlx::query_scalar("SELECT \"identifier\" FROM \"translations\" ORDER BY \"identifier\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(identifiers)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Translation>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&TRANSLATIONS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Translation, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Translation not found".to_string()))
    }

    pub async fn identifier_exists(&self, identifier: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "translations", "identifier", identifier, None).await
    }

    pub async fn create(&self, input: TranslationCreate, actor: Option<i64>) -> Result<Translation, DatabaseError> {
        if self.identifier_exists(&input.identifier).await? {
            return Err(DatabaseError::Conflict(IDENTIFIER_TAKEN.to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"translations\" (\"identifier\", \"text\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $3) RETURNING \"id\"",
        )
        .bind(&input.identifier)
        .bind(&input.text)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_links(&mut tx, &TRANSLATION_LANGUAGES, id, &input.languages).await?;
        tx.commit().await?;

        info!("Created translation {} ({})", input.identifier, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: TranslationUpdate, actor: Option<i64>) -> Result<Translation, DatabaseError> {
        self.get(id).await?;
        if let Some(identifier) = &input.identifier {
            if value_taken(&self.pool, "translations", "identifier", identifier, Some(id)).await? {
                return Err(DatabaseError::Conflict(IDENTIFIER_TAKEN.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"translations\" SET \"identifier\" = COALESCE($2, \"identifier\"), \"text\" = COALESCE($3, \"text\"), \
             \"updated_at\" = now(), \"updated_by\" = $4 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.identifier)
        .bind(&input.text)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(languages) = &input.languages {
            replace_links(&mut tx, &TRANSLATION_LANGUAGES, id, languages).await?;
        }
        tx.commit().await?;

        debug!("Updated translation {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Translation, DatabaseError> {
        let translation = self.get(id).await?;
        sqlx::query("DELETE FROM \"translations\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted translation {}", id);
        Ok(translation)
    }
}
