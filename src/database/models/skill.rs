use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::category::CategoryRef;
use super::text::{LocalizedTextOut, TextInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub skill_texts: Json<Vec<LocalizedTextOut>>,
    pub categories: Json<Vec<CategoryRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SkillCreate {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub kind: String,
    #[serde(default)]
    #[validate(nested)]
    pub skill_texts: Vec<TextInput>,
    #[serde(default)]
    pub categories: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SkillUpdate {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub kind: Option<String>,
    #[validate(nested)]
    pub skill_texts: Option<Vec<TextInput>>,
    pub categories: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRef {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
}

/// Response of the skill name uniqueness check.
#[derive(Debug, Clone, Serialize)]
pub struct SkillNameCheck {
    pub exists: bool,
    pub name: String,
    pub language_id: i64,
}
