use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Language {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub image: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LanguageCreate {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub image: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LanguageUpdate {
    #[validate(length(min = 1, max = 16))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub image: Option<String>,
    pub is_default: Option<bool>,
}
