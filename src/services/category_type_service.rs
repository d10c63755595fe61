use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{CategoryType, CategoryTypeCreate, CategoryTypeUpdate};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::CATEGORY_TYPES, ListParams};

use super::{order_by_keys, Page};

const SELECT: &str = "SELECT t.\"code\", t.\"name\", t.\"created_at\", t.\"updated_at\", t.\"created_by\", \
     t.\"updated_by\" FROM \"category_types\" t";

/// Category types are keyed by their `code`; there is no numeric id.
pub struct CategoryTypeService {
    pool: PgPool,
}

impl CategoryTypeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_codes(&self) -> Result<Vec<String>, DatabaseError> {
        let codes = sqlx::query_scalar("SELECT \"code\" FROM \"category_types\" ORDER BY \"code\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(codes)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<CategoryType>, DatabaseError> {
        let (codes, total) = QueryBuilder::new(&CATEGORY_TYPES, params)?.page::<String>(&self.pool).await?;
        let items = if codes.is_empty() {
            vec![]
        } else {
            let sql = format!("{} WHERE t.\"code\" = ANY($1)", SELECT);
            let rows: Vec<CategoryType> = sqlx::query_as(&sql).bind(&codes).fetch_all(&self.pool).await?;
            order_by_keys(rows, &codes, |row| row.code.clone())
        };
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, code: &str) -> Result<CategoryType, DatabaseError> {
        let sql = format!("{} WHERE t.\"code\" = $1", SELECT);
        sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Category type not found".to_string()))
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM \"category_types\" WHERE \"code\" = $1)")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, input: CategoryTypeCreate, actor: Option<i64>) -> Result<CategoryType, DatabaseError> {
        if self.code_exists(&input.code).await? {
            return Err(DatabaseError::Conflict(
                "The category type with this code already exists in the system.".to_string(),
            ));
        }
        sqlx::query(
            "INSERT INTO \"category_types\" (\"code\", \"name\", \"created_by\", \"updated_by\") VALUES ($1, $2, $3, $3)",
        )
        .bind(&input.code)
        .bind(&input.name)
        .bind(actor)
        .execute(&self.pool)
        .await?;

        info!("Created category type {}", input.code);
        self.get(&input.code).await
    }

    pub async fn update(&self, code: &str, input: CategoryTypeUpdate, actor: Option<i64>) -> Result<CategoryType, DatabaseError> {
        self.get(code).await?;
        if input.code.as_deref().is_some_and(|new_code| new_code != code) {
            return Err(DatabaseError::Invalid(
                "Cannot change category type code as it is the primary key".to_string(),
            ));
        }
        sqlx::query(
            "UPDATE \"category_types\" SET \"name\" = COALESCE($2, \"name\"), \"updated_at\" = now(), \"updated_by\" = $3 \
             WHERE \"code\" = $1",
        )
        .bind(code)
        .bind(&input.name)
        .bind(actor)
        .execute(&self.pool)
        .await?;

        debug!("Updated category type {}", code);
        self.get(code).await
    }

    pub async fn delete(&self, code: &str) -> Result<CategoryType, DatabaseError> {
        let category_type = self.get(code).await?;
        sqlx::query("DELETE FROM \"category_types\" WHERE \"code\" = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        info!("Deleted category type {}", code);
        Ok(category_type)
    }
}
