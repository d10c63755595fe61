use super::error::FilterError;
use super::fields::EntitySchema;
use super::filter_order::{FilterOrder, OrderClause};
use super::filter_where::{FilterWhere, ROOT_ALIAS};
use super::types::{ListParams, SqlResult};

/// A validated listing query over one entity table: page of keys plus total.
pub struct Filter<'s> {
    schema: &'s EntitySchema,
    where_clause: String,
    params: Vec<serde_json::Value>,
    order: OrderClause,
    limit: i64,
    offset: i64,
}

impl<'s> Filter<'s> {
    pub fn new(schema: &'s EntitySchema, list: &ListParams) -> Result<Self, FilterError> {
        if list.page < 1 {
            return Err(FilterError::InvalidPage("page must be greater than 0".to_string()));
        }
        let max_page_size = list.options.max_page_size;
        if !(1..=max_page_size).contains(&list.page_size) {
            return Err(FilterError::InvalidPageSize(format!(
                "pageSize must be between 1 and {}",
                max_page_size
            )));
        }
        let offset = list.offset()?;

        let (where_clause, params) = FilterWhere::generate(schema, &list.filters, list.options)?;
        let order = FilterOrder::generate(schema, list.sort_field.as_deref(), list.sort_order, list.options)?;

        Ok(Self {
            schema,
            where_clause,
            params,
            order,
            limit: list.page_size,
            offset,
        })
    }

    pub fn schema(&self) -> &EntitySchema {
        self.schema
    }

    /// Select the primary keys of the requested page, in order.
    pub fn to_sql(&self) -> SqlResult {
        let query = [
            format!("SELECT {}.\"{}\"", ROOT_ALIAS, self.schema.primary_key),
            format!("FROM \"{}\" {}", self.schema.table, ROOT_ALIAS),
            self.order.join.clone(),
            format!("WHERE {}", self.where_clause),
            self.order.order_by.clone(),
            format!("LIMIT {} OFFSET {}", self.limit, self.offset),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.params.clone() }
    }

    /// Same predicate as `to_sql`, without ordering or paging.
    pub fn to_count_sql(&self) -> SqlResult {
        let query = format!(
            "SELECT COUNT(*) AS count FROM \"{}\" {} WHERE {}",
            self.schema.table, ROOT_ALIAS, self.where_clause
        );
        SqlResult { query, params: self.params.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::fields::{PROJECTS, SKILLS};
    use crate::filter::types::{FilterCondition, SortDirection};
    use serde_json::json;

    #[test]
    fn page_and_count_share_the_predicate() {
        let list = ListParams {
            page: 2,
            page_size: 5,
            filters: vec![FilterCondition::new("repository_url", "contains", "github")],
            sort_field: Some("name".to_string()),
            sort_order: SortDirection::Desc,
            ..Default::default()
        };
        let filter = Filter::new(&PROJECTS, &list).unwrap();

        let page = filter.to_sql();
        assert!(page.query.starts_with("SELECT t.\"id\" FROM \"projects\" t LEFT JOIN \"project_texts\" s"));
        assert!(page.query.contains("WHERE t.\"repository_url\" ILIKE $1 ORDER BY s.\"name\" DESC NULLS LAST"));
        assert!(page.query.ends_with("LIMIT 5 OFFSET 5"));

        let count = filter.to_count_sql();
        assert_eq!(count.query, "SELECT COUNT(*) AS count FROM \"projects\" t WHERE t.\"repository_url\" ILIKE $1");
        assert_eq!(count.params, vec![json!("%github%")]);
        assert_eq!(page.params, count.params);
    }

    #[test]
    fn rejects_out_of_range_paging() {
        let zero_page = ListParams { page: 0, ..Default::default() };
        assert!(matches!(Filter::new(&SKILLS, &zero_page), Err(FilterError::InvalidPage(_))));

        let huge = ListParams { page_size: 101, ..Default::default() };
        assert!(matches!(Filter::new(&SKILLS, &huge), Err(FilterError::InvalidPageSize(_))));

        let far = ListParams { page: i64::MAX, page_size: 10, ..Default::default() };
        assert!(matches!(Filter::new(&SKILLS, &far), Err(FilterError::InvalidPage(_))));
    }

    #[test]
    fn page_size_bound_follows_options() {
        let mut list = ListParams { page_size: 30, ..Default::default() };
        list.options.max_page_size = 25;
        assert!(matches!(Filter::new(&SKILLS, &list), Err(FilterError::InvalidPageSize(_))));

        list.page_size = 25;
        assert!(Filter::new(&SKILLS, &list).is_ok());
    }
}
