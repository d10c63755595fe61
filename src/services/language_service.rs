use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::database::models::{Language, LanguageCreate, LanguageUpdate};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::LANGUAGES, ListParams};

use super::{fetch_one, fetch_ordered, value_taken, Page};

const SELECT: &str = "SELECT t.\"id\", t.\"code\", t.\"name\", t.\"image\", t.\"is_default\", \
     t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"languages\" t";

const CODE_TAKEN: &str = "The language with this code already exists in the system.";
const NAME_TAKEN: &str = "The language with this name already exists in the system.";

pub struct LanguageService {
    pool: PgPool,
}

impl LanguageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Codes of every language, default first.
    pub async fn list_codes(&self) -> Result<Vec<String>, DatabaseError> {
        let codes = sqlx::query_scalar("SELECT \"code\" FROM \"languages\" ORDER BY \"is_default\" DESC, \"id\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(codes)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Language>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&LANGUAGES, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Language, DatabaseError> {
        fetch_one(&self.pool, SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Language not found".to_string()))
    }

    pub async fn get_default(&self) -> Result<Option<Language>, DatabaseError> {
        let sql = format!("{} WHERE t.\"is_default\"", SELECT);
        let language = sqlx::query_as(&sql).fetch_optional(&self.pool).await?;
        Ok(language)
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "languages", "code", code, None).await
    }

    pub async fn create(&self, input: LanguageCreate, actor: Option<i64>) -> Result<Language, DatabaseError> {
        self.ensure_unique(Some(&input.code), Some(&input.name), None).await?;

        let mut tx = self.pool.begin().await?;
        let has_default: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM \"languages\" WHERE \"is_default\")")
            .fetch_one(&mut *tx)
            .await?;
        // the first language is always the default
        let is_default = input.is_default || !has_default;
        if is_default {
            clear_default(&mut tx, actor).await?;
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"languages\" (\"code\", \"name\", \"image\", \"is_default\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING \"id\"",
        )
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.image)
        .bind(is_default)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Created language {} ({}), default={}", input.code, id, is_default);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: LanguageUpdate, actor: Option<i64>) -> Result<Language, DatabaseError> {
        let current = self.get(id).await?;
        self.ensure_unique(input.code.as_deref(), input.name.as_deref(), Some(id)).await?;

        if current.is_default && input.is_default == Some(false) {
            return Err(DatabaseError::Invalid(
                "Cannot unset the default language; make another language the default instead".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        if input.is_default == Some(true) && !current.is_default {
            clear_default(&mut tx, actor).await?;
        }
        sqlx::query(
            "UPDATE \"languages\" SET \"code\" = COALESCE($2, \"code\"), \"name\" = COALESCE($3, \"name\"), \
             \"image\" = COALESCE($4, \"image\"), \"is_default\" = COALESCE($5, \"is_default\"), \
             \"updated_at\" = now(), \"updated_by\" = $6 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.image)
        .bind(input.is_default)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!("Updated language {}", id);
        self.get(id).await
    }

    /// Point `image` at a stored upload; returns the language and the path it replaced.
    pub async fn set_image(
        &self,
        id: i64,
        image: &str,
        actor: Option<i64>,
    ) -> Result<(Language, Option<String>), DatabaseError> {
        let current = self.get(id).await?;
        sqlx::query("UPDATE \"languages\" SET \"image\" = $2, \"updated_at\" = now(), \"updated_by\" = $3 WHERE \"id\" = $1")
            .bind(id)
            .bind(image)
            .bind(actor)
            .execute(&self.pool)
            .await?;
        Ok((self.get(id).await?, current.image))
    }

    /// Whether any language still points at `image`.
    pub async fn image_in_use(&self, image: &str) -> Result<bool, DatabaseError> {
        let used = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM \"languages\" WHERE \"image\" = $1)")
            .bind(image)
            .fetch_one(&self.pool)
            .await?;
        Ok(used)
    }

    pub async fn delete(&self, id: i64) -> Result<Language, DatabaseError> {
        let language = self.get(id).await?;
        if language.is_default {
            return Err(DatabaseError::Invalid("Cannot delete the default language".to_string()));
        }
        sqlx::query("DELETE FROM \"languages\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted language {} ({})", language.code, id);
        Ok(language)
    }

    async fn ensure_unique(&self, code: Option<&str>, name: Option<&str>, exclude: Option<i64>) -> Result<(), DatabaseError> {
        if let Some(code) = code {
            if value_taken(&self.pool, "languages", "code", code, exclude).await? {
                return Err(DatabaseError::Conflict(CODE_TAKEN.to_string()));
            }
        }
        if let Some(name) = name {
            if value_taken(&self.pool, "languages", "name", name, exclude).await? {
                return Err(DatabaseError::Conflict(NAME_TAKEN.to_string()));
            }
        }
        Ok(())
    }
}

async fn clear_default(conn: &mut PgConnection, actor: Option<i64>) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE \"languages\" SET \"is_default\" = FALSE, \"updated_at\" = now(), \"updated_by\" = $1 WHERE \"is_default\"",
    )
    .bind(actor)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
