use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::texts::LocalizedText;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A stored text row as returned with its owner. Section texts carry `text`;
/// every other entity carries `name` and `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedTextOut {
    pub id: i64,
    pub language_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub language: LanguageRef,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TextInput {
    pub language_id: i64,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl LocalizedText for TextInput {
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn language_id(&self) -> i64 {
        self.language_id
    }

    fn values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SectionTextInput {
    pub language_id: i64,
    pub text: String,
}

impl LocalizedText for SectionTextInput {
    const COLUMNS: &'static [&'static str] = &["text"];

    fn language_id(&self) -> i64 {
        self.language_id
    }

    fn values(&self) -> Vec<&str> {
        vec![self.text.as_str()]
    }
}

/// Image row of a project or portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImageOut {
    pub id: i64,
    pub image_path: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImageInput {
    #[validate(length(min = 1))]
    pub image_path: String,
    #[serde(default = "default_image_category")]
    pub category: String,
}

pub fn default_image_category() -> String {
    "gallery".to_string()
}

/// `{id, name}` summary used by lightweight listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NamedSummary {
    pub id: i64,
    pub name: Option<String>,
}
