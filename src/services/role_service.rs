use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{Role, RoleCreate, RoleUpdate};
use crate::database::relations::{replace_links, ROLE_PERMISSIONS};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::ROLES, ListParams};

use super::refs::permission_refs;
use super::{fetch_one, fetch_ordered, value_taken, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"name\", t.\"description\", {} AS \"permissions\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"roles\" t",
        permission_refs(&ROLE_PERMISSIONS, "t.\"id\"")
    )
});

const NAME_TAKEN: &str = "Role already exists";

pub struct RoleService {
    pool: PgPool,
}

impl RoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_names(&self) -> Result<Vec<String>, DatabaseError> {
        let names = sqlx::query_scalar("SELECT \"name\" FROM \"roles\" ORDER BY \"name\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Role>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&ROLES, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Role, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Role not found".to_string()))
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "roles", "name", name, None).await
    }

    pub async fn create(&self, input: RoleCreate, actor: Option<i64>) -> Result<Role, DatabaseError> {
        if self.name_exists(&input.name).await? {
            return Err(DatabaseError::Conflict(NAME_TAKEN.to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"roles\" (\"name\", \"description\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $3) RETURNING \"id\"",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_links(&mut tx, &ROLE_PERMISSIONS, id, &input.permissions).await?;
        tx.commit().await?;

        info!("Created role {} ({})", input.name, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: RoleUpdate, actor: Option<i64>) -> Result<Role, DatabaseError> {
        self.get(id).await?;
        if let Some(name) = &input.name {
            if value_taken(&self.pool, "roles", "name", name, Some(id)).await? {
                return Err(DatabaseError::Conflict(NAME_TAKEN.to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"roles\" SET \"name\" = COALESCE($2, \"name\"), \"description\" = COALESCE($3, \"description\"), \
             \"updated_at\" = now(), \"updated_by\" = $4 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(permissions) = &input.permissions {
            replace_links(&mut tx, &ROLE_PERMISSIONS, id, permissions).await?;
        }
        tx.commit().await?;

        debug!("Updated role {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<Role, DatabaseError> {
        let role = self.get(id).await?;
        sqlx::query("DELETE FROM \"roles\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted role {} ({})", role.name, id);
        Ok(role)
    }
}
