//! Per-entity services. Each one owns a pool handle, runs listings through the
//! shared `QueryBuilder` and hydrates the resulting keys into full rows.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::database::models::{
    Category, Experience, Language, Permission, Portfolio, Project, Role, Section, Skill, Translation, User,
};
use crate::database::DatabaseError;
use crate::filter::ListParams;

pub mod category_service;
pub mod category_type_service;
pub mod experience_service;
pub mod language_service;
pub mod permission_service;
pub mod portfolio_service;
pub mod project_service;
pub mod refs;
pub mod role_service;
pub mod section_service;
pub mod skill_service;
pub mod translation_service;
pub mod user_service;

pub use category_service::CategoryService;
pub use category_type_service::CategoryTypeService;
pub use experience_service::ExperienceService;
pub use language_service::LanguageService;
pub use permission_service::PermissionService;
pub use portfolio_service::PortfolioService;
pub use project_service::ProjectService;
pub use role_service::RoleService;
pub use section_service::SectionService;
pub use skill_service::SkillService;
pub use translation_service::TranslationService;
pub use user_service::UserService;

/// One page of a `/full` listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

/// Rows keyed by a BIGSERIAL `id`.
pub trait HasId {
    fn id(&self) -> i64;
}

macro_rules! impl_has_id {
    ($($ty:ty),* $(,)?) => {
        $(impl HasId for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

impl_has_id!(Language, Translation, Section, Experience, Category, Skill, Project, Portfolio, User, Role, Permission);

/// Reorder `rows` to follow `keys`; rows without a key are dropped.
pub fn order_by_keys<T, K, F>(rows: Vec<T>, keys: &[K], key_of: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut by_key: HashMap<K, T> = rows.into_iter().map(|row| (key_of(&row), row)).collect();
    keys.iter().filter_map(|k| by_key.remove(k)).collect()
}

/// Run `select` (whose root table is aliased `t`) for `ids`, in `ids` order.
pub(crate) async fn fetch_ordered<T>(pool: &PgPool, select: &str, ids: &[i64]) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + HasId,
{
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let sql = format!("{} WHERE t.\"id\" = ANY($1)", select);
    let rows: Vec<T> = sqlx::query_as(&sql).bind(ids).fetch_all(pool).await?;
    Ok(order_by_keys(rows, ids, |row| row.id()))
}

/// Run `select` for a single id; `None` when absent.
pub(crate) async fn fetch_one<T>(pool: &PgPool, select: &str, id: i64) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("{} WHERE t.\"id\" = $1", select);
    let row = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row)
}

/// `true` when `table` has a row with `column = value`, optionally ignoring `exclude_id`.
pub(crate) async fn value_taken(
    pool: &PgPool,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"{}\" = $1 AND ($2::BIGINT IS NULL OR \"id\" <> $2))",
        table, column
    );
    let exists: bool = sqlx::query_scalar(&sql).bind(value).bind(exclude_id).fetch_one(pool).await?;
    Ok(exists)
}
