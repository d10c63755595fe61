use crate::config::FilterConfig;

use super::error::FilterError;
use super::types::{FilterCondition, FilterOptions, ListParams, SortDirection};

/// Raw `/full` query string: `page`, `pageSize`, the parallel
/// `filterField[]`/`filterValue[]`/`filterOperator[]` arrays, `sortField`,
/// `sortOrder`, plus per-entity shortcut parameters.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for ListQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl ListQuery {
    /// `shortcuts` names query parameters that become `contains` filters on the same field.
    pub fn into_params(self, config: &FilterConfig, shortcuts: &[&str]) -> Result<ListParams, FilterError> {
        let mut page = 1;
        let mut page_size = config.default_page_size;
        let mut fields = vec![];
        let mut values = vec![];
        let mut operators = vec![];
        let mut shortcut_filters = vec![];
        let mut sort_field = None;
        let mut sort_order = SortDirection::Asc;

        for (key, value) in self.pairs {
            match key.trim_end_matches("[]") {
                "page" => {
                    page = value
                        .parse::<i64>()
                        .map_err(|_| FilterError::InvalidPage(format!("'{}' is not a number", value)))?;
                }
                "pageSize" => {
                    page_size = value
                        .parse::<i64>()
                        .map_err(|_| FilterError::InvalidPageSize(format!("'{}' is not a number", value)))?;
                }
                "filterField" => fields.push(value),
                "filterValue" => values.push(value),
                "filterOperator" => operators.push(value),
                "sortField" => {
                    if !value.trim().is_empty() {
                        sort_field = Some(value);
                    }
                }
                "sortOrder" => sort_order = SortDirection::parse(&value)?,
                other if shortcuts.contains(&other) => {
                    if !value.trim().is_empty() {
                        shortcut_filters.push(FilterCondition::new(other, "contains", value));
                    }
                }
                _ => {}
            }
        }

        if page < 1 {
            return Err(FilterError::InvalidPage("page must be greater than 0".to_string()));
        }
        if page_size < 1 || page_size > config.max_page_size {
            return Err(FilterError::InvalidPageSize(format!(
                "pageSize must be between 1 and {}",
                config.max_page_size
            )));
        }
        if fields.len() != values.len() {
            return Err(FilterError::MismatchedArrays(format!(
                "{} filterField values but {} filterValue values",
                fields.len(),
                values.len()
            )));
        }
        if !operators.is_empty() && operators.len() != fields.len() {
            return Err(FilterError::MismatchedArrays(format!(
                "{} filterField values but {} filterOperator values",
                fields.len(),
                operators.len()
            )));
        }

        let mut filters: Vec<FilterCondition> = fields
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(i, (field, value))| {
                let operator = operators.get(i).cloned().unwrap_or_else(|| "contains".to_string());
                FilterCondition { field, operator, value }
            })
            .collect();
        filters.extend(shortcut_filters);

        let params = ListParams {
            page,
            page_size,
            filters,
            sort_field,
            sort_order,
            options: FilterOptions {
                strict_fields: config.strict_fields,
                debug_logging: config.debug_logging,
                max_page_size: config.max_page_size,
            },
        };
        params.offset()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        ListQuery::from(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<Vec<_>>())
    }

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let params = query(&[]).into_params(&FilterConfig::default(), &[]).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
        assert!(params.filters.is_empty());
        assert_eq!(params.sort_field, None);
        assert_eq!(params.sort_order, SortDirection::Asc);
        assert!(params.options.strict_fields);
    }

    #[test]
    fn parallel_arrays_zip_into_conditions() {
        let params = query(&[
            ("page", "2"),
            ("pageSize", "25"),
            ("filterField[]", "name"),
            ("filterValue[]", "Rust"),
            ("filterOperator[]", "startsWith"),
            ("filterField[]", "skills"),
            ("filterValue[]", "4"),
            ("filterOperator[]", "equals"),
            ("sortField", "name"),
            ("sortOrder", "desc"),
        ])
        .into_params(&FilterConfig::default(), &[])
        .unwrap();

        assert_eq!(params.page, 2);
        assert_eq!(params.page_size, 25);
        assert_eq!(
            params.filters,
            vec![
                FilterCondition::new("name", "startsWith", "Rust"),
                FilterCondition::new("skills", "equals", "4"),
            ]
        );
        assert_eq!(params.sort_field.as_deref(), Some("name"));
        assert_eq!(params.sort_order, SortDirection::Desc);
    }

    #[test]
    fn missing_operators_default_to_contains() {
        let params = query(&[("filterField", "code"), ("filterValue", "en")])
            .into_params(&FilterConfig::default(), &[])
            .unwrap();
        assert_eq!(params.filters, vec![FilterCondition::new("code", "contains", "en")]);
    }

    #[test]
    fn shortcuts_become_contains_filters() {
        let params = query(&[("code", "PRJ"), ("name", ""), ("other", "ignored")])
            .into_params(&FilterConfig::default(), &["code", "name"])
            .unwrap();
        assert_eq!(params.filters, vec![FilterCondition::new("code", "contains", "PRJ")]);
    }

    #[test]
    fn rejects_bad_paging_and_mismatched_arrays() {
        let config = FilterConfig::default();
        assert!(matches!(query(&[("page", "0")]).into_params(&config, &[]), Err(FilterError::InvalidPage(_))));
        assert!(matches!(query(&[("page", "x")]).into_params(&config, &[]), Err(FilterError::InvalidPage(_))));
        assert!(matches!(
            query(&[("page", "9223372036854775807"), ("pageSize", "10")]).into_params(&config, &[]),
            Err(FilterError::InvalidPage(_))
        ));
        assert!(matches!(
            query(&[("pageSize", "101")]).into_params(&config, &[]),
            Err(FilterError::InvalidPageSize(_))
        ));
        assert!(matches!(
            query(&[("filterField[]", "name")]).into_params(&config, &[]),
            Err(FilterError::MismatchedArrays(_))
        ));
        assert!(matches!(
            query(&[("sortOrder", "up")]).into_params(&config, &[]),
            Err(FilterError::InvalidSortOrder(_))
        ));
    }
}
