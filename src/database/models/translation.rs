use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::text::LanguageRef;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Translation {
    pub id: i64,
    pub identifier: String,
    pub text: String,
    pub languages: Json<Vec<LanguageRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TranslationCreate {
    #[validate(length(min = 1, max = 255))]
    pub identifier: String,
    pub text: String,
    #[serde(default)]
    pub languages: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TranslationUpdate {
    #[validate(length(min = 1, max = 255))]
    pub identifier: Option<String>,
    pub text: Option<String>,
    pub languages: Option<Vec<i64>>,
}
