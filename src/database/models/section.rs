use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::text::{LocalizedTextOut, SectionTextInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Section {
    pub id: i64,
    pub code: String,
    pub section_texts: Json<Vec<LocalizedTextOut>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SectionCreate {
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[serde(default)]
    pub section_texts: Vec<SectionTextInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SectionUpdate {
    #[validate(length(min = 1, max = 100))]
    pub code: Option<String>,
    pub section_texts: Option<Vec<SectionTextInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRef {
    pub id: i64,
    pub code: String,
}
