use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::error::FilterError;
use super::fields::{ColumnType, EntitySchema, FieldKind};
use super::types::{FilterCondition, FilterOp, FilterOptions, OperatorSet};

/// Alias of the entity table in generated SQL.
pub const ROOT_ALIAS: &str = "t";

struct RelationGroup {
    table: &'static str,
    owner_key: &'static str,
    target_key: &'static str,
    ids: Vec<i64>,
}

pub struct FilterWhere<'s> {
    schema: &'s EntitySchema,
    options: FilterOptions,
    param_values: Vec<Value>,
    param_index: usize,
}

impl<'s> FilterWhere<'s> {
    pub fn new(schema: &'s EntitySchema, options: FilterOptions, starting_param_index: usize) -> Self {
        Self {
            schema,
            options,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Build the WHERE predicate for `filters`. Returns `1=1` when nothing applies.
    pub fn generate(
        schema: &'s EntitySchema,
        filters: &[FilterCondition],
        options: FilterOptions,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(schema, options, 0);
        filter_where.build(filters)
    }

    fn build(&mut self, filters: &[FilterCondition]) -> Result<(String, Vec<Value>), FilterError> {
        let mut column_conditions = vec![];
        let mut localized_conditions = vec![];
        let mut relation_groups: Vec<RelationGroup> = vec![];

        for condition in filters {
            let Some(field) = self.schema.field(&condition.field) else {
                if self.options.strict_fields {
                    return Err(FilterError::UnknownField {
                        entity: self.schema.entity.to_string(),
                        field: condition.field.clone(),
                    });
                }
                tracing::warn!("Ignoring unknown filter field '{}' on {}", condition.field, self.schema.entity);
                continue;
            };

            match field.kind {
                FieldKind::Column { column, ty } => {
                    let op = FilterOp::parse(&condition.operator, self.schema.operators)?;
                    let expr = format!("{}.\"{}\"", ROOT_ALIAS, column);
                    column_conditions.push(self.predicate(&expr, ty, op, &condition.value));
                }
                FieldKind::Localized { column } => {
                    let op = FilterOp::parse(&condition.operator, self.schema.operators)?;
                    let expr = format!("x.\"{}\"", column);
                    localized_conditions.push(self.predicate(&expr, ColumnType::Text, op, &condition.value));
                }
                FieldKind::Relation { table, owner_key, target_key } => {
                    let id = condition.value.trim().parse::<i64>().map_err(|_| FilterError::InvalidRelationValue {
                        field: condition.field.clone(),
                        value: condition.value.clone(),
                    })?;
                    match relation_groups
                        .iter_mut()
                        .find(|g| g.table == table && g.target_key == target_key)
                    {
                        Some(group) => {
                            if !group.ids.contains(&id) {
                                group.ids.push(id);
                            }
                        }
                        None => relation_groups.push(RelationGroup { table, owner_key, target_key, ids: vec![id] }),
                    }
                }
            }
        }

        let mut sql_conditions = column_conditions;

        if !localized_conditions.is_empty() {
            // Localized predicates share one text row so name/description filters apply together.
            if let Some(texts) = self.schema.texts {
                sql_conditions.push(format!(
                    "EXISTS (SELECT 1 FROM \"{}\" x WHERE x.\"{}\" = {}.\"{}\" AND {})",
                    texts.table,
                    texts.owner_key,
                    ROOT_ALIAS,
                    self.schema.primary_key,
                    localized_conditions.join(" AND ")
                ));
            }
        }

        for group in relation_groups {
            let placeholders: Vec<String> = group.ids.iter().map(|id| self.param(Value::from(*id))).collect();
            sql_conditions.push(format!(
                "EXISTS (SELECT 1 FROM \"{}\" r WHERE r.\"{}\" = {}.\"{}\" AND r.\"{}\" IN ({}))",
                group.table,
                group.owner_key,
                ROOT_ALIAS,
                self.schema.primary_key,
                group.target_key,
                placeholders.join(", ")
            ));
        }

        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        if self.options.debug_logging {
            tracing::debug!("Filter WHERE for {}: {} {:?}", self.schema.entity, where_clause, self.param_values);
        }
        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn predicate(&mut self, expr: &str, ty: ColumnType, op: FilterOp, value: &str) -> String {
        let case_insensitive = self.schema.operators == OperatorSet::Basic;

        if op.is_pattern() {
            let target = if ty == ColumnType::Text { expr.to_string() } else { format!("CAST({} AS TEXT)", expr) };
            let like = if case_insensitive { "ILIKE" } else { "LIKE" };
            return format!("{} {} {}", target, like, self.param(Value::from(op.like_pattern(value))));
        }

        let Some(cmp) = op.comparison_sql() else { return "FALSE".to_string() };
        // Unparsable typed values make the predicate false, except `neq` which holds.
        let unmatched = if op == FilterOp::Neq { "TRUE" } else { "FALSE" };

        match ty {
            ColumnType::Text if case_insensitive => {
                format!("LOWER({}) {} LOWER({})", expr, cmp, self.param(Value::from(value)))
            }
            ColumnType::Text => format!("{} {} {}", expr, cmp, self.param(Value::from(value))),
            ColumnType::Integer => match value.trim().parse::<i64>() {
                Ok(n) => format!("{} {} {}", expr, cmp, self.param(Value::from(n))),
                Err(_) => unmatched.to_string(),
            },
            ColumnType::Boolean => match parse_bool(value) {
                Some(b) => format!("{} {} {}", expr, cmp, self.param(Value::from(b))),
                None => unmatched.to_string(),
            },
            ColumnType::Timestamp => match normalize_timestamp(value) {
                Some(ts) => format!("{} {} CAST({} AS TIMESTAMPTZ)", expr, cmp, self.param(Value::from(ts))),
                None => unmatched.to_string(),
            },
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn normalize_timestamp(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.to_rfc3339());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| format!("{}T00:00:00+00:00", d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::fields::{LANGUAGES, PERMISSIONS, PROJECTS, SECTIONS};
    use serde_json::json;

    fn strict() -> FilterOptions {
        FilterOptions { strict_fields: true, ..Default::default() }
    }

    #[test]
    fn empty_filters_match_everything() {
        let (sql, params) = FilterWhere::generate(&LANGUAGES, &[], strict()).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn basic_operators_are_case_insensitive() {
        let filters = vec![
            FilterCondition::new("code", "contains", "e"),
            FilterCondition::new("name", "equals", "English"),
        ];
        let (sql, params) = FilterWhere::generate(&LANGUAGES, &filters, strict()).unwrap();
        assert_eq!(sql, "t.\"code\" ILIKE $1 AND LOWER(t.\"name\") = LOWER($2)");
        assert_eq!(params, vec![json!("%e%"), json!("English")]);
    }

    #[test]
    fn integer_columns_cast_for_patterns_and_compare_typed_for_equals() {
        let filters = vec![
            FilterCondition::new("id", "startsWith", "1"),
            FilterCondition::new("id", "equals", "42"),
            FilterCondition::new("id", "equals", "forty-two"),
        ];
        let (sql, params) = FilterWhere::generate(&LANGUAGES, &filters, strict()).unwrap();
        assert_eq!(sql, "CAST(t.\"id\" AS TEXT) ILIKE $1 AND t.\"id\" = $2 AND FALSE");
        assert_eq!(params, vec![json!("1%"), json!(42)]);
    }

    #[test]
    fn localized_fields_share_one_exists_clause() {
        let filters = vec![
            FilterCondition::new("name", "contains", "api"),
            FilterCondition::new("description", "endsWith", "rust"),
        ];
        let (sql, _) = FilterWhere::generate(&PROJECTS, &filters, strict()).unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM \"project_texts\" x WHERE x.\"project_id\" = t.\"id\" \
             AND x.\"name\" ILIKE $1 AND x.\"description\" ILIKE $2)"
        );
    }

    #[test]
    fn relation_values_are_or_grouped_per_join_table() {
        let filters = vec![
            FilterCondition::new("skill", "contains", "3"),
            FilterCondition::new("skills", "contains", "5"),
            FilterCondition::new("skill", "contains", "3"),
            FilterCondition::new("category", "contains", "7"),
        ];
        let (sql, params) = FilterWhere::generate(&PROJECTS, &filters, strict()).unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM \"project_skills\" r WHERE r.\"project_id\" = t.\"id\" AND r.\"skill_id\" IN ($1, $2)) \
             AND EXISTS (SELECT 1 FROM \"project_categories\" r WHERE r.\"project_id\" = t.\"id\" AND r.\"category_id\" IN ($3))"
        );
        assert_eq!(params, vec![json!(3), json!(5), json!(7)]);
    }

    #[test]
    fn section_language_filter_uses_text_table() {
        let filters = vec![FilterCondition::new("language", "contains", "2")];
        let (sql, _) = FilterWhere::generate(&SECTIONS, &filters, strict()).unwrap();
        assert!(sql.contains("FROM \"section_texts\" r WHERE r.\"section_id\" = t.\"id\" AND r.\"language_id\" IN ($1)"));
    }

    #[test]
    fn non_integer_relation_value_is_rejected() {
        let filters = vec![FilterCondition::new("skills", "contains", "rust")];
        let err = FilterWhere::generate(&PROJECTS, &filters, strict()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRelationValue { .. }));
    }

    #[test]
    fn unknown_fields_reject_when_strict_and_ignore_otherwise() {
        let filters = vec![FilterCondition::new("password", "contains", "x")];
        let err = FilterWhere::generate(&LANGUAGES, &filters, strict()).unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));

        let lenient = FilterOptions { strict_fields: false, ..Default::default() };
        let (sql, params) = FilterWhere::generate(&LANGUAGES, &filters, lenient).unwrap();
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn extended_operators_compare_ids_numerically() {
        let filters = vec![
            FilterCondition::new("id", "gte", "2"),
            FilterCondition::new("id", "neq", "abc"),
            FilterCondition::new("id", "lt", "abc"),
            FilterCondition::new("name", "startswith", "EDIT_"),
        ];
        let (sql, params) = FilterWhere::generate(&PERMISSIONS, &filters, strict()).unwrap();
        assert_eq!(sql, "t.\"id\" >= $1 AND TRUE AND FALSE AND t.\"name\" LIKE $2");
        assert_eq!(params, vec![json!(2), json!("EDIT\\_%")]);
    }

    #[test]
    fn extended_substring_on_id_casts_to_text() {
        let filters = vec![FilterCondition::new("id", "contains", "1")];
        let (sql, _) = FilterWhere::generate(&PERMISSIONS, &filters, strict()).unwrap();
        assert_eq!(sql, "CAST(t.\"id\" AS TEXT) LIKE $1");
    }

    #[test]
    fn basic_set_rejects_extended_operator() {
        let filters = vec![FilterCondition::new("code", "gt", "a")];
        let err = FilterWhere::generate(&LANGUAGES, &filters, strict()).unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOperator("gt".to_string()));
    }

    #[test]
    fn timestamps_compare_as_timestamptz() {
        let filters = vec![FilterCondition::new("created_at", "equals", "2024-05-01")];
        let (sql, params) = FilterWhere::generate(&LANGUAGES, &filters, strict()).unwrap();
        assert_eq!(sql, "t.\"created_at\" = CAST($1 AS TIMESTAMPTZ)");
        assert_eq!(params, vec![json!("2024-05-01T00:00:00+00:00")]);
    }
}
