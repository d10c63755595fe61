use sqlx::PgConnection;

use crate::database::manager::DatabaseError;

/// A many-to-many join table seen from its owning side.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub table: &'static str,
    pub owner_key: &'static str,
    pub target_key: &'static str,
    pub target_table: &'static str,
    /// Singular name used in error messages, e.g. "category".
    pub label: &'static str,
}

pub const TRANSLATION_LANGUAGES: Link = Link {
    table: "translation_languages",
    owner_key: "translation_id",
    target_key: "language_id",
    target_table: "languages",
    label: "language",
};

pub const CATEGORY_SKILLS: Link = Link {
    table: "category_skills",
    owner_key: "category_id",
    target_key: "skill_id",
    target_table: "skills",
    label: "skill",
};

pub const SKILL_CATEGORIES: Link = Link {
    table: "category_skills",
    owner_key: "skill_id",
    target_key: "category_id",
    target_table: "categories",
    label: "category",
};

pub const PROJECT_CATEGORIES: Link = Link {
    table: "project_categories",
    owner_key: "project_id",
    target_key: "category_id",
    target_table: "categories",
    label: "category",
};

pub const PROJECT_SKILLS: Link = Link {
    table: "project_skills",
    owner_key: "project_id",
    target_key: "skill_id",
    target_table: "skills",
    label: "skill",
};

pub const PORTFOLIO_CATEGORIES: Link = Link {
    table: "portfolio_categories",
    owner_key: "portfolio_id",
    target_key: "category_id",
    target_table: "categories",
    label: "category",
};

pub const PORTFOLIO_EXPERIENCES: Link = Link {
    table: "portfolio_experiences",
    owner_key: "portfolio_id",
    target_key: "experience_id",
    target_table: "experiences",
    label: "experience",
};

pub const PORTFOLIO_PROJECTS: Link = Link {
    table: "portfolio_projects",
    owner_key: "portfolio_id",
    target_key: "project_id",
    target_table: "projects",
    label: "project",
};

pub const PORTFOLIO_SECTIONS: Link = Link {
    table: "portfolio_sections",
    owner_key: "portfolio_id",
    target_key: "section_id",
    target_table: "sections",
    label: "section",
};

pub const USER_ROLES: Link = Link {
    table: "user_roles",
    owner_key: "user_id",
    target_key: "role_id",
    target_table: "roles",
    label: "role",
};

pub const ROLE_PERMISSIONS: Link = Link {
    table: "role_permissions",
    owner_key: "role_id",
    target_key: "permission_id",
    target_table: "permissions",
    label: "permission",
};

/// Fail with `Invalid {label} IDs: [...]` unless every id exists in `table`.
pub async fn ensure_ids_exist(
    conn: &mut PgConnection,
    table: &str,
    label: &str,
    ids: &[i64],
) -> Result<(), DatabaseError> {
    if ids.is_empty() {
        return Ok(());
    }
    let sql = format!("SELECT \"id\" FROM \"{}\" WHERE \"id\" = ANY($1)", table);
    let found: Vec<i64> = sqlx::query_scalar(&sql).bind(ids).fetch_all(&mut *conn).await?;

    let mut missing: Vec<i64> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    missing.sort_unstable();
    missing.dedup();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatabaseError::Invalid(format!("Invalid {} IDs: {:?}", label, missing)))
    }
}

/// Replace every link of `owner_id` with `ids` (duplicates collapse).
pub async fn replace_links(
    conn: &mut PgConnection,
    link: &Link,
    owner_id: i64,
    ids: &[i64],
) -> Result<(), DatabaseError> {
    ensure_ids_exist(conn, link.target_table, link.label, ids).await?;

    let delete = format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", link.table, link.owner_key);
    sqlx::query(&delete).bind(owner_id).execute(&mut *conn).await?;

    if ids.is_empty() {
        return Ok(());
    }
    let insert = format!(
        "INSERT INTO \"{}\" (\"{}\", \"{}\") SELECT $1, x FROM UNNEST($2::BIGINT[]) AS x GROUP BY x",
        link.table, link.owner_key, link.target_key
    );
    sqlx::query(&insert).bind(owner_id).bind(ids).execute(&mut *conn).await?;
    Ok(())
}

/// JSON array of linked rows, built in SQL. `fields` are `(key, expression)`
/// pairs where expressions address the linked row as `o`.
pub fn links_json(link: &Link, owner_expr: &str, fields: &[(&str, &str)]) -> String {
    let object = fields
        .iter()
        .map(|(key, expr)| format!("'{}', {}", key, expr))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "COALESCE((SELECT json_agg(json_build_object({}) ORDER BY o.\"id\") FROM \"{}\" o \
         JOIN \"{}\" j ON j.\"{}\" = o.\"id\" WHERE j.\"{}\" = {}), '[]'::json)",
        object, link.target_table, link.table, link.target_key, link.owner_key, owner_expr
    )
}
