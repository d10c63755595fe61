use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{NamedSummary, Skill, SkillCreate, SkillNameCheck, SkillUpdate};
use crate::database::relations::{replace_links, SKILL_CATEGORIES};
use crate::database::texts::{default_text_expr, replace_texts, texts_json};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::fields::{SKILLS, SKILL_TEXTS};
use crate::filter::ListParams;

use super::refs::category_refs;
use super::{fetch_one, fetch_ordered, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"type\", {} AS \"skill_texts\", {} AS \"categories\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"skills\" t",
        texts_json(&SKILL_TEXTS, &["name", "description"], "t.\"id\""),
        category_refs(&SKILL_CATEGORIES, "t.\"id\"")
    )
});

static SUMMARY: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", {} AS \"name\" FROM \"skills\" t ORDER BY t.\"id\"",
        default_text_expr(&SKILL_TEXTS, "name", "t.\"id\"")
    )
});

pub struct SkillService {
    pool: PgPool,
}

impl SkillService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `{id, name}` of every skill, named in the default language.
    pub async fn list_summaries(&self) -> Result<Vec<NamedSummary>, DatabaseError> {
        let summaries = sqlx::query_as(&SUMMARY).fetch_all(&self.pool).await?;
        Ok(summaries)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Skill>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&SKILLS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn list_by_type(&self, kind: &str) -> Result<Vec<Skill>, DatabaseError> {
        let sql = format!("{} WHERE t.\"type\" = $1 ORDER BY t.\"id\"", *SELECT);
        let skills = sqlx::query_as(&sql).bind(kind).fetch_all(&self.pool).await?;
        Ok(skills)
    }

    pub async fn get(&self, id: i64) -> Result<Skill, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Skill not found".to_string()))
    }

    /// Case-insensitive lookup of a skill name within one language.
    pub async fn check_name(
        &self,
        name: &str,
        language_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<SkillNameCheck, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM \"skill_texts\" WHERE LOWER(\"name\") = LOWER($1) \
             AND \"language_id\" = $2 AND ($3::BIGINT IS NULL OR \"skill_id\" <> $3))",
        )
        .bind(name)
        .bind(language_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(SkillNameCheck {
            exists,
            name: name.to_string(),
            language_id,
        })
    }

    pub async fn create(&self, input: SkillCreate, actor: Option<i64>) -> Result<Skill, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"skills\" (\"type\", \"created_by\", \"updated_by\") VALUES ($1, $2, $2) RETURNING \"id\"",
        )
        .bind(&input.kind)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_texts(&mut tx, &SKILL_TEXTS, id, &input.skill_texts, actor).await?;
        replace_links(&mut tx, &SKILL_CATEGORIES, id, &input.categories).await?;
        tx.commit().await?;

        info!("Created skill {} of type {}", id, input.kind);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: SkillUpdate, actor: Option<i64>) -> Result<Skill, DatabaseError> {
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"skills\" SET \"type\" = COALESCE($2, \"type\"), \"updated_at\" = now(), \"updated_by\" = $3 \
             WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.kind)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(texts) = &input.skill_texts {
            replace_texts(&mut tx, &SKILL_TEXTS, id, texts, actor).await?;
        }
        if let Some(categories) = &input.categories {
            replace_links(&mut tx, &SKILL_CATEGORIES, id, categories).await?;
        }
        tx.commit().await?;

        debug!("Updated skill {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Skill, DatabaseError> {
        let skill = self.get(id).await?;
        sqlx::query("DELETE FROM \"skills\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted skill {}", id);
        Ok(skill)
    }
}
