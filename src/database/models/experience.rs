use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::text::{LocalizedTextOut, TextInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experience {
    pub id: i64,
    pub code: String,
    pub years: i32,
    pub experience_texts: Json<Vec<LocalizedTextOut>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExperienceCreate {
    /// Generated as `EXP-<id>` when omitted.
    #[validate(length(min = 1, max = 100))]
    pub code: Option<String>,
    #[validate(range(min = 0))]
    pub years: i32,
    #[serde(default)]
    #[validate(nested)]
    pub experience_texts: Vec<TextInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ExperienceUpdate {
    #[validate(length(min = 1, max = 100))]
    pub code: Option<String>,
    #[validate(range(min = 0))]
    pub years: Option<i32>,
    #[validate(nested)]
    pub experience_texts: Option<Vec<TextInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRef {
    pub id: i64,
    pub code: String,
    pub years: i32,
}
