//! SQL fragments for the compact related-entity objects embedded in responses.
//! Each returns a JSON array expression for the links of `owner_expr`.

use crate::database::relations::{links_json, Link};
use crate::database::texts::default_text_expr;
use crate::filter::fields::{CATEGORY_TEXTS, PROJECT_TEXTS, SKILL_TEXTS};

const LINKED_ID: &str = "o.\"id\"";

pub fn category_refs(link: &Link, owner_expr: &str) -> String {
    let name = default_text_expr(&CATEGORY_TEXTS, "name", LINKED_ID);
    links_json(
        link,
        owner_expr,
        &[("id", LINKED_ID), ("code", "o.\"code\""), ("type", "o.\"type\""), ("name", name.as_str())],
    )
}

pub fn skill_refs(link: &Link, owner_expr: &str) -> String {
    let name = default_text_expr(&SKILL_TEXTS, "name", LINKED_ID);
    links_json(link, owner_expr, &[("id", LINKED_ID), ("type", "o.\"type\""), ("name", name.as_str())])
}

pub fn project_refs(link: &Link, owner_expr: &str) -> String {
    let name = default_text_expr(&PROJECT_TEXTS, "name", LINKED_ID);
    links_json(
        link,
        owner_expr,
        &[
            ("id", LINKED_ID),
            ("name", name.as_str()),
            ("repository_url", "o.\"repository_url\""),
            ("website_url", "o.\"website_url\""),
        ],
    )
}

pub fn experience_refs(link: &Link, owner_expr: &str) -> String {
    links_json(link, owner_expr, &[("id", LINKED_ID), ("code", "o.\"code\""), ("years", "o.\"years\"")])
}

pub fn section_refs(link: &Link, owner_expr: &str) -> String {
    links_json(link, owner_expr, &[("id", LINKED_ID), ("code", "o.\"code\"")])
}

pub fn role_refs(link: &Link, owner_expr: &str) -> String {
    links_json(link, owner_expr, &[("id", LINKED_ID), ("name", "o.\"name\"")])
}

pub fn permission_refs(link: &Link, owner_expr: &str) -> String {
    links_json(
        link,
        owner_expr,
        &[("id", LINKED_ID), ("name", "o.\"name\""), ("description", "o.\"description\"")],
    )
}

/// `images` array of a project or portfolio, oldest first.
pub fn images_json(table: &str, owner_key: &str, owner_expr: &str) -> String {
    format!(
        "COALESCE((SELECT json_agg(json_build_object('id', i.\"id\", 'image_path', i.\"image_path\", \
         'category', i.\"category\") ORDER BY i.\"id\") FROM \"{}\" i WHERE i.\"{}\" = {}), '[]'::json)",
        table, owner_key, owner_expr
    )
}
