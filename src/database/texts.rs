use std::collections::HashSet;

use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::relations::ensure_ids_exist;
use crate::filter::fields::TextTable;

/// One localized text row of a create/update payload.
pub trait LocalizedText {
    /// Text columns written besides the owner key and `language_id`.
    const COLUMNS: &'static [&'static str];

    fn language_id(&self) -> i64;

    fn values(&self) -> Vec<&str>;
}

/// Replace all text rows of `owner_id` with `rows`, one per language.
pub async fn replace_texts<T: LocalizedText>(
    conn: &mut PgConnection,
    texts: &TextTable,
    owner_id: i64,
    rows: &[T],
    actor: Option<i64>,
) -> Result<(), DatabaseError> {
    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.language_id()) {
            return Err(DatabaseError::Invalid(format!(
                "Duplicate text for language {}",
                row.language_id()
            )));
        }
    }
    let language_ids: Vec<i64> = rows.iter().map(|r| r.language_id()).collect();
    ensure_ids_exist(conn, "languages", "language", &language_ids).await?;

    let delete = format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", texts.table, texts.owner_key);
    sqlx::query(&delete).bind(owner_id).execute(&mut *conn).await?;

    let insert = insert_sql::<T>(texts);
    for row in rows {
        let mut q = sqlx::query(&insert).bind(owner_id).bind(row.language_id());
        for value in row.values() {
            q = q.bind(value);
        }
        q.bind(actor).execute(&mut *conn).await?;
    }
    Ok(())
}

fn insert_sql<T: LocalizedText>(texts: &TextTable) -> String {
    let columns = T::COLUMNS.iter().map(|c| format!(", \"{}\"", c)).collect::<String>();
    let placeholders = (0..T::COLUMNS.len()).map(|i| format!(", ${}", i + 3)).collect::<String>();
    let actor = T::COLUMNS.len() + 3;
    format!(
        "INSERT INTO \"{}\" (\"{}\", \"language_id\"{}, \"created_by\", \"updated_by\") VALUES ($1, $2{}, ${}, ${})",
        texts.table, texts.owner_key, columns, placeholders, actor, actor
    )
}

/// JSON array of an owner's text rows with their language, built in SQL.
pub fn texts_json(texts: &TextTable, columns: &[&str], owner_expr: &str) -> String {
    let values = columns
        .iter()
        .map(|c| format!(", '{}', x.\"{}\"", c, c))
        .collect::<String>();
    format!(
        "COALESCE((SELECT json_agg(json_build_object('id', x.\"id\", 'language_id', x.\"language_id\"{}, \
         'language', json_build_object('id', l.\"id\", 'code', l.\"code\", 'name', l.\"name\")) ORDER BY x.\"language_id\") \
         FROM \"{}\" x JOIN \"languages\" l ON l.\"id\" = x.\"language_id\" WHERE x.\"{}\" = {}), '[]'::json)",
        values, texts.table, texts.owner_key, owner_expr
    )
}

/// Scalar subquery: `column` of the owner's text in the default language.
pub fn default_text_expr(texts: &TextTable, column: &str, owner_expr: &str) -> String {
    format!(
        "(SELECT d.\"{}\" FROM \"{}\" d JOIN \"languages\" dl ON dl.\"id\" = d.\"language_id\" \
         WHERE dl.\"is_default\" AND d.\"{}\" = {} LIMIT 1)",
        column, texts.table, texts.owner_key, owner_expr
    )
}
