use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryType {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryTypeCreate {
    #[validate(length(min = 1, max = 5))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// `code` is the primary key; it may be repeated but never changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryTypeUpdate {
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}
