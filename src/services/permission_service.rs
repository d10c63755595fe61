use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{Permission, PermissionCreate, PermissionUpdate};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::PERMISSIONS, ListParams};

use super::{fetch_one, fetch_ordered, value_taken, Page};

const SELECT: &str = "SELECT t.\"id\", t.\"name\", t.\"description\", t.\"created_at\", t.\"updated_at\", \
     t.\"created_by\", t.\"updated_by\" FROM \"permissions\" t";

const NAME_TAKEN: &str = "Permission already exists";

/// Permissions every installation starts with.
pub const CORE_PERMISSIONS: &[(&str, &str)] = &[
    ("CREATE_USER", "Allows creating new users"),
    ("EDIT_USER", "Allows editing user details"),
    ("DELETE_USER", "Allows deleting users"),
    ("VIEW_USER", "Allows viewing user details"),
    ("CREATE_ROLE", "Allows creating new roles"),
    ("EDIT_ROLE", "Allows editing role details"),
    ("DELETE_ROLE", "Allows deleting roles"),
    ("VIEW_ROLE", "Allows viewing role details"),
];

pub struct PermissionService {
    pool: PgPool,
}

impl PermissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_names(&self) -> Result<Vec<String>, DatabaseError> {
        let names = sqlx::query_scalar("SELECT \"name\" FROM \"permissions\" ORDER BY \"name\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<Permission>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&PERMISSIONS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<Permission, DatabaseError> {
        fetch_one(&self.pool, SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Permission not found".to_string()))
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "permissions", "name", name, None).await
    }

    pub async fn create(&self, input: PermissionCreate, actor: Option<i64>) -> Result<Permission, DatabaseError> {
        if self.name_exists(&input.name).await? {
            return Err(DatabaseError::Conflict(NAME_TAKEN.to_string()));
        }
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"permissions\" (\"name\", \"description\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $3) RETURNING \"id\"",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;

        info!("Created permission {} ({})", input.name, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: PermissionUpdate, actor: Option<i64>) -> Result<Permission, DatabaseError> {
        self.get(id).await?;
        if let Some(name) = &input.name {
            if value_taken(&self.pool, "permissions", "name", name, Some(id)).await? {
                return Err(DatabaseError::Conflict("Permission name already exists".to_string()));
            }
        }
        sqlx::query(
            "UPDATE \"permissions\" SET \"name\" = COALESCE($2, \"name\"), \
             \"description\" = COALESCE($3, \"description\"), \"updated_at\" = now(), \"updated_by\" = $4 \
             WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(actor)
        .execute(&self.pool)
        .await?;

        debug!("Updated permission {}", id);
        self.get(id).await
    }

    /// Refuses while any role still holds the permission.
    pub async fn delete(&self, id: i64) -> Result<Permission, DatabaseError> {
        let permission = self.get(id).await?;
        let assigned: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM \"role_permissions\" WHERE \"permission_id\" = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if assigned {
            return Err(DatabaseError::Invalid(
                "Cannot delete permission as it is assigned to roles".to_string(),
            ));
        }
        sqlx::query("DELETE FROM \"permissions\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted permission {} ({})", permission.name, id);
        Ok(permission)
    }

    /// Insert any missing core permission; returns how many were added.
    pub async fn seed_core_permissions(&self) -> Result<u64, DatabaseError> {
        let mut added = 0;
        for (name, description) in CORE_PERMISSIONS {
            let result = sqlx::query(
                "INSERT INTO \"permissions\" (\"name\", \"description\") VALUES ($1, $2) ON CONFLICT (\"name\") DO NOTHING",
            )
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;
            added += result.rows_affected();
        }
        if added > 0 {
            info!("Seeded {} core permissions", added);
        }
        Ok(added)
    }
}
