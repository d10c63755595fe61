use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use validator::Validate;

use super::category::CategoryRef;
use super::experience::ExperienceRef;
use super::project::ProjectRef;
use super::section::SectionRef;
use super::text::{ImageInput, ImageOut};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub categories: Json<Vec<CategoryRef>>,
    pub experiences: Json<Vec<ExperienceRef>>,
    pub projects: Json<Vec<ProjectRef>>,
    pub sections: Json<Vec<SectionRef>>,
    pub images: Json<Vec<ImageOut>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PortfolioCreate {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub experiences: Vec<i64>,
    #[serde(default)]
    pub projects: Vec<i64>,
    #[serde(default)]
    pub sections: Vec<i64>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PortfolioUpdate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub experiences: Option<Vec<i64>>,
    pub projects: Option<Vec<i64>>,
    pub sections: Option<Vec<i64>>,
}
