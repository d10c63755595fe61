use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{Category, CategoryCreate, CategoryUpdate};
use crate::database::relations::{replace_links, CATEGORY_SKILLS};
use crate::database::texts::{replace_texts, texts_json};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::fields::{CATEGORIES, CATEGORY_TEXTS};
use crate::filter::ListParams;

use super::refs::skill_refs;
use super::{fetch_one, fetch_ordered, value_taken, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"code\", t.\"type\", {} AS \"category_texts\", {} AS \"skills\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"categories\" t",
        texts_json(&CATEGORY_TEXTS, &["name", "description"], "t.\"id\""),
        skill_refs(&CATEGORY_SKILLS, "t.\"id\"")
    )
});

const CODE_TAKEN: &str = "The category with this code already exists in the system.";

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_codes(&self) -> Result<Vec<String>, DatabaseError> {
        let codes = sqlx::query_scalar("SELECT \"code\" FROM \"categories\" ORDER BY \"code\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(codes)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Category>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&CATEGORIES, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn list_by_type(&self, kind: &str) -> Result<Vec<Category>, DatabaseError> {
        let sql = format!("{} WHERE t.\"type\" = $1 ORDER BY t.\"id\"", *SELECT);
        let categories = sqlx::query_as(&sql).bind(kind).fetch_all(&self.pool).await?;
        Ok(categories)
    }

    pub async fn get(&self, id: i64) -> Result<Category, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Category not found".to_string()))
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "categories", "code", code, None).await
    }

    pub async fn create(&self, input: CategoryCreate, actor: Option<i64>) -> Result<Category, DatabaseError> {
        if self.code_exists(&input.code).await? {
            return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"categories\" (\"code\", \"type\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $3) RETURNING \"id\"",
        )
        .bind(&input.code)
        .bind(&input.kind)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_texts(&mut tx, &CATEGORY_TEXTS, id, &input.category_texts, actor).await?;
        replace_links(&mut tx, &CATEGORY_SKILLS, id, &input.skills).await?;
        tx.commit().await?;

        info!("Created category {} ({})", input.code, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: CategoryUpdate, actor: Option<i64>) -> Result<Category, DatabaseError> {
        self.get(id).await?;
        if let Some(code) = &input.code {
            if value_taken(&self.pool, "categories", "code", code, Some(id)).await? {
                return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"categories\" SET \"code\" = COALESCE($2, \"code\"), \"type\" = COALESCE($3, \"type\"), \
             \"updated_at\" = now(), \"updated_by\" = $4 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.kind)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(texts) = &input.category_texts {
            replace_texts(&mut tx, &CATEGORY_TEXTS, id, texts, actor).await?;
        }
        if let Some(skills) = &input.skills {
            replace_links(&mut tx, &CATEGORY_SKILLS, id, skills).await?;
        }
        tx.commit().await?;

        debug!("Updated category {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Category, DatabaseError> {
        let category = self.get(id).await?;
        sqlx::query("DELETE FROM \"categories\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted category {} ({})", category.code, id);
        Ok(category)
    }
}
