use super::error::FilterError;
use super::fields::{EntitySchema, FieldKind};
use super::filter_where::ROOT_ALIAS;
use super::types::{FilterOptions, SortDirection};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    /// Extra JOIN needed by the ordering, empty when none.
    pub join: String,
    pub order_by: String,
}

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(
        schema: &EntitySchema,
        sort_field: Option<&str>,
        sort: SortDirection,
        options: FilterOptions,
    ) -> Result<OrderClause, FilterError> {
        let key = format!("{}.\"{}\"", ROOT_ALIAS, schema.primary_key);
        let tie_breaker = format!("{} ASC", key);

        let requested = sort_field.map(str::trim).filter(|s| !s.is_empty());
        let Some(name) = requested.or(schema.default_sort) else {
            return Ok(OrderClause { join: String::new(), order_by: format!("ORDER BY {}", tie_breaker) });
        };

        let unknown = || {
            if options.strict_fields {
                Err(FilterError::UnknownSortField { entity: schema.entity.to_string(), field: name.to_string() })
            } else {
                tracing::warn!("Ignoring unknown sort field '{}' on {}", name, schema.entity);
                Ok(OrderClause { join: String::new(), order_by: format!("ORDER BY {}", tie_breaker) })
            }
        };

        let Some(field) = schema.field(name) else { return unknown() };

        match field.kind {
            FieldKind::Column { column, .. } if column == schema.primary_key => Ok(OrderClause {
                join: String::new(),
                order_by: format!("ORDER BY {} {}", key, sort.to_sql()),
            }),
            FieldKind::Column { column, .. } => Ok(OrderClause {
                join: String::new(),
                order_by: format!("ORDER BY {}.\"{}\" {}, {}", ROOT_ALIAS, column, sort.to_sql(), tie_breaker),
            }),
            FieldKind::Localized { column } => {
                let Some(texts) = schema.texts else { return unknown() };
                // At most one text row per language, so the join cannot duplicate rows.
                let join = format!(
                    "LEFT JOIN \"{}\" s ON s.\"{}\" = {} AND s.\"language_id\" = \
                     (SELECT l.\"id\" FROM \"languages\" l WHERE l.\"is_default\" LIMIT 1)",
                    texts.table, texts.owner_key, key
                );
                Ok(OrderClause {
                    join,
                    order_by: format!("ORDER BY s.\"{}\" {} NULLS LAST, {}", column, sort.to_sql(), tie_breaker),
                })
            }
            FieldKind::Relation { .. } => unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::fields::{CATEGORY_TYPES, LANGUAGES, PROJECTS};

    fn strict() -> FilterOptions {
        FilterOptions { strict_fields: true, ..Default::default() }
    }

    #[test]
    fn no_sort_orders_by_primary_key() {
        let clause = FilterOrder::generate(&LANGUAGES, None, SortDirection::Desc, strict()).unwrap();
        assert_eq!(clause.order_by, "ORDER BY t.\"id\" ASC");
        assert!(clause.join.is_empty());
    }

    #[test]
    fn column_sort_keeps_key_tie_breaker() {
        let clause = FilterOrder::generate(&LANGUAGES, Some("name"), SortDirection::Desc, strict()).unwrap();
        assert_eq!(clause.order_by, "ORDER BY t.\"name\" DESC, t.\"id\" ASC");
    }

    #[test]
    fn localized_sort_joins_default_language_text() {
        let clause = FilterOrder::generate(&PROJECTS, Some("name"), SortDirection::Asc, strict()).unwrap();
        assert!(clause.join.starts_with("LEFT JOIN \"project_texts\" s ON s.\"project_id\" = t.\"id\""));
        assert!(clause.join.contains("l.\"is_default\""));
        assert_eq!(clause.order_by, "ORDER BY s.\"name\" ASC NULLS LAST, t.\"id\" ASC");
    }

    #[test]
    fn category_types_default_to_code_order() {
        let clause = FilterOrder::generate(&CATEGORY_TYPES, None, SortDirection::Asc, strict()).unwrap();
        assert_eq!(clause.order_by, "ORDER BY t.\"code\" ASC");
    }

    #[test]
    fn relation_and_unknown_sort_fields() {
        assert!(FilterOrder::generate(&PROJECTS, Some("skills"), SortDirection::Asc, strict()).is_err());
        assert!(FilterOrder::generate(&PROJECTS, Some("bogus"), SortDirection::Asc, strict()).is_err());

        let lenient = FilterOptions { strict_fields: false, ..Default::default() };
        let clause = FilterOrder::generate(&PROJECTS, Some("bogus"), SortDirection::Asc, lenient).unwrap();
        assert_eq!(clause.order_by, "ORDER BY t.\"id\" ASC");
    }
}
