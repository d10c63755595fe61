use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::skill::SkillRef;
use super::text::{LocalizedTextOut, TextInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub code: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub category_texts: Json<Vec<LocalizedTextOut>>,
    pub skills: Json<Vec<SkillRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub kind: String,
    #[serde(default)]
    #[validate(nested)]
    pub category_texts: Vec<TextInput>,
    #[serde(default)]
    pub skills: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 100))]
    pub code: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub kind: Option<String>,
    #[validate(nested)]
    pub category_texts: Option<Vec<TextInput>>,
    pub skills: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
}
