use once_cell::sync::Lazy;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::{User, UserCreate, UserUpdate};
use crate::database::relations::{replace_links, USER_ROLES};
use crate::database::{DatabaseError, QueryBuilder};
use crate::filter::{fields::USERS, ListParams};

use super::refs::role_refs;
use super::{fetch_one, fetch_ordered, value_taken, Page};

static SELECT: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT t.\"id\", t.\"username\", t.\"email\", t.\"is_active\", {} AS \"roles\", \
         t.\"created_at\", t.\"updated_at\", t.\"created_by\", t.\"updated_by\" FROM \"users\" t",
        role_refs(&USER_ROLES, "t.\"id\"")
    )
});

const USERNAME_TAKEN: &str = "Username already registered";
const EMAIL_TAKEN: &str = "Email already registered";

/// User administration. Callers hash passwords before they reach this service.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_usernames(&self) -> Result<Vec<String>, DatabaseError> {
        let usernames = sqlx::query_scalar("SELECT \"username\" FROM \"users\" ORDER BY \"username\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(usernames)
    }

    pub async fn list_full(&self, params: &ListParams) -> Result<Page<User>, DatabaseError> {
        let (ids, total) = QueryBuilder::new(&USERS, params)?.page::<i64>(&self.pool).await?;
        let items = fetch_ordered(&self.pool, &SELECT, &ids).await?;
        Ok(Page::new(items, total, params))
    }

    pub async fn get(&self, id: i64) -> Result<User, DatabaseError> {
        fetch_one(&self.pool, &SELECT, id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        value_taken(&self.pool, "users", "username", username, None).await
    }

    pub async fn create(&self, input: &UserCreate, hashed_password: &str, actor: Option<i64>) -> Result<User, DatabaseError> {
        self.ensure_unique(Some(&input.username), Some(&input.email), None).await?;

        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO \"users\" (\"username\", \"email\", \"hashed_password\", \"created_by\", \"updated_by\") \
             VALUES ($1, $2, $3, $4, $4) RETURNING \"id\"",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(hashed_password)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;
        replace_links(&mut tx, &USER_ROLES, id, &input.roles).await?;
        tx.commit().await?;

        info!("Created user {} ({})", input.username, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: UserUpdate, actor: Option<i64>) -> Result<User, DatabaseError> {
        self.get(id).await?;
        self.ensure_unique(input.username.as_deref(), input.email.as_deref(), Some(id)).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE \"users\" SET \"username\" = COALESCE($2, \"username\"), \"email\" = COALESCE($3, \"email\"), \
             \"is_active\" = COALESCE($4, \"is_active\"), \"updated_at\" = now(), \"updated_by\" = $5 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(&input.username)
        .bind(&input.email)
        .bind(input.is_active)
        .bind(actor)
        .execute(&mut *tx)
        .await?;
        if let Some(roles) = &input.roles {
            replace_links(&mut tx, &USER_ROLES, id, roles).await?;
        }
        tx.commit().await?;

        debug!("Updated user {}", id);
        self.get(id).await
    }

    pub async fn set_password(&self, id: i64, hashed_password: &str, actor: Option<i64>) -> Result<User, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE \"users\" SET \"hashed_password\" = $2, \"updated_at\" = now(), \"updated_by\" = $3 WHERE \"id\" = $1",
        )
        .bind(id)
        .bind(hashed_password)
        .bind(actor)
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }
        info!("Password changed for user {}", id);
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<User, DatabaseError> {
        let user = self.get(id).await?;
        sqlx::query("DELETE FROM \"users\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        info!("Deleted user {} ({})", user.username, id);
        Ok(user)
    }

    async fn ensure_unique(&self, username: Option<&str>, email: Option<&str>, exclude: Option<i64>) -> Result<(), DatabaseError> {
        if let Some(username) = username {
            if value_taken(&self.pool, "users", "username", username, exclude).await? {
                return Err(DatabaseError::Conflict(USERNAME_TAKEN.to_string()));
            }
        }
        if let Some(email) = email {
            if value_taken(&self.pool, "users", "email", email, exclude).await? {
                return Err(DatabaseError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }
        Ok(())
    }
}
