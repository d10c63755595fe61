use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::role::RoleRef;

/// A user as exposed by the API; the password hash is never selected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub roles: Json<Vec<RoleRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub roles: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}
