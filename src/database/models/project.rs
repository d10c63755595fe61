use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::category::CategoryRef;
use super::skill::SkillRef;
use super::text::{ImageInput, ImageOut, LocalizedTextOut, TextInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub repository_url: Option<String>,
    pub website_url: Option<String>,
    pub project_texts: Json<Vec<LocalizedTextOut>>,
    pub images: Json<Vec<ImageOut>>,
    pub attachments: Json<Vec<AttachmentOut>>,
    pub categories: Json<Vec<CategoryRef>>,
    pub skills: Json<Vec<SkillRef>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttachmentOut {
    pub id: i64,
    pub file_path: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachmentInput {
    #[validate(length(min = 1))]
    pub file_path: String,
    #[validate(length(min = 1))]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectCreate {
    #[validate(url)]
    pub repository_url: Option<String>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub project_texts: Vec<TextInput>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<AttachmentInput>,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub skills: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[validate(url)]
    pub repository_url: Option<String>,
    #[validate(url)]
    pub website_url: Option<String>,
    #[validate(nested)]
    pub project_texts: Option<Vec<TextInput>>,
    pub categories: Option<Vec<i64>>,
    pub skills: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: i64,
    pub name: Option<String>,
    pub repository_url: Option<String>,
    pub website_url: Option<String>,
}
