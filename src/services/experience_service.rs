use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{Experience, ExperienceCreate, ExperienceUpdate};
use crate::database::texts::{replace_texts, texts_json};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::fields::{EXPERIENCES, EXPERIENCE_TEXTS};
use crate::filter::ListParams;

use super::{fetch_one, fetch_ordered, value_taken, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"code\", t.\"years\", {} AS \"experience_texts\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"experiences\" t",
        texts_json(&EXPERIENCE_TEXTS, &["name", "description"], "t.\"id\"")
    )
});

const CODE_TAKEN: &str = "The experience with this code already exists in the system.";

/// Code assigned to experiences created without one.
pub fn generated_code(id: i64) -> String {
    format!("EXP-{}", id)
}

pub struct ExperienceService {
    pool: PgPool,
}

impl ExperienceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_codes(&self) -> Result<Vec<String>, DatabaseError> {
        let codes = sqlx::query_scalar("SELECT \"code\" FROM \"experiences\" ORDER BY \"code\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(codes)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Experience>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&EXPERIENCES, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Experience, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Experience not found".to_string()))
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "experiences", "code", code, None).await
    }

    pub async fn create(&self, input: ExperienceCreate, actor: Option<i64>) -> Result<Experience, DatabaseError> {
        if let Some(code) = &input.code {
            if self.code_exists(code).await? {
                return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        // the id is drawn up front so a missing code can be derived from it
        let id: i64 = sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('experiences', 'id'))")
            .fetch_one(&mut *tx)
            .await?;
        let code = input.code.clone().unwrap_or_else(|| generated_code(id));
        sqlx::query(
            "INSERT INTO \"experiences\" (\"id\", \"code\", \"years\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $4, $4)",
        )
        .bind(id)
        .bind(&code)
        .bind(input.years)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        replace_texts(&mut tx, &EXPERIENCE_TEXTS, id, &input.experience_texts, actor).await?;
        tx.commit().await?;

        info!("Created experience {} ({})", code, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: ExperienceUpdate, actor: Option<i64>) -> Result<Experience, DatabaseError> {
        self.get(id).await?;
        if let Some(code) = &input.code {
            if value_taken(&self.pool, "experiences", "code", code, Some(id)).await? {
                return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"experiences\" SET \"code\" = COALESCE($2, \"code\"), \"years\" = COALESCE($3, \"years\"), \
             \"updated_at\" = now(), \"updated_by\" = $4 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.code)
        .bind(input.years)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(texts) = &input.experience_texts {
            replace_texts(&mut tx, &EXPERIENCE_TEXTS, id, texts, actor).await?;
        }
        tx.commit().await?;

        debug!("Updated experience {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Experience, DatabaseError> {
        let experience = self.get(id).await?;
        sqlx::query("DELETE FROM \"experiences\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted experience {} ({})", experience.code, id);
        Ok(experience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_exp_prefix() {
        assert_eq!(generated_code(12), "EXP-12");
    }
}
