use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Which operator vocabulary an entity listing accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorSet {
    /// `contains`, `equals`, `startsWith`, `endsWith`; case-insensitive.
    Basic,
    /// `eq`, `neq`, `gt`, `gte`, `lt`, `lte`, `contains`, `startswith`, `endswith`; case-sensitive.
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Contains,
    StartsWith,
    EndsWith,
    Equals,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    /// Parse an operator name against the vocabulary of `set`. Matching ignores ASCII case.
    pub fn parse(name: &str, set: OperatorSet) -> Result<Self, FilterError> {
        let lowered = name.trim().to_ascii_lowercase();
        let op = match (set, lowered.as_str()) {
            (_, "contains") => FilterOp::Contains,
            (_, "startswith") => FilterOp::StartsWith,
            (_, "endswith") => FilterOp::EndsWith,
            (OperatorSet::Basic, "equals") => FilterOp::Equals,
            (OperatorSet::Extended, "eq") => FilterOp::Eq,
            (OperatorSet::Extended, "neq") => FilterOp::Neq,
            (OperatorSet::Extended, "gt") => FilterOp::Gt,
            (OperatorSet::Extended, "gte") => FilterOp::Gte,
            (OperatorSet::Extended, "lt") => FilterOp::Lt,
            (OperatorSet::Extended, "lte") => FilterOp::Lte,
            _ => return Err(FilterError::UnsupportedOperator(name.to_string())),
        };
        Ok(op)
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith)
    }

    pub fn comparison_sql(&self) -> Option<&'static str> {
        match self {
            FilterOp::Equals | FilterOp::Eq => Some("="),
            FilterOp::Neq => Some("<>"),
            FilterOp::Gt => Some(">"),
            FilterOp::Gte => Some(">="),
            FilterOp::Lt => Some("<"),
            FilterOp::Lte => Some("<="),
            _ => None,
        }
    }

    /// Build the LIKE pattern for pattern operators, escaping wildcards in `value`.
    pub fn like_pattern(&self, value: &str) -> String {
        let escaped = escape_like(value);
        match self {
            FilterOp::StartsWith => format!("{}%", escaped),
            FilterOp::EndsWith => format!("%{}", escaped),
            _ => format!("%{}%", escaped),
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// One `(field, operator, value)` triple as received from the query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidSortOrder(s.to_string()))
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Hard ceiling for `pageSize`; configuration may only lower it.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub strict_fields: bool,
    pub debug_logging: bool,
    pub max_page_size: i64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            strict_fields: true,
            debug_logging: false,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Parsed, validated input of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub page: i64,
    pub page_size: i64,
    pub filters: Vec<FilterCondition>,
    pub sort_field: Option<String>,
    pub sort_order: SortDirection,
    pub options: FilterOptions,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            filters: vec![],
            sort_field: None,
            sort_order: SortDirection::Asc,
            options: FilterOptions::default(),
        }
    }
}

impl ListParams {
    /// Rows skipped before this page; pages whose offset does not fit an `i64` are rejected.
    pub fn offset(&self) -> Result<i64, FilterError> {
        self.page
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(self.page_size))
            .ok_or_else(|| FilterError::InvalidPage(format!("page {} is out of range", self.page)))
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_set_rejects_extended_operators() {
        assert_eq!(FilterOp::parse("startsWith", OperatorSet::Basic), Ok(FilterOp::StartsWith));
        assert_eq!(FilterOp::parse("equals", OperatorSet::Basic), Ok(FilterOp::Equals));
        assert!(FilterOp::parse("gt", OperatorSet::Basic).is_err());
        assert!(FilterOp::parse("equals", OperatorSet::Extended).is_err());
        assert_eq!(FilterOp::parse("gte", OperatorSet::Extended), Ok(FilterOp::Gte));
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(FilterOp::Contains.like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(FilterOp::StartsWith.like_pattern("a\\b"), "a\\\\b%");
        assert_eq!(FilterOp::EndsWith.like_pattern("rs"), "%rs");
    }

    #[test]
    fn offset_is_zero_based() {
        let params = ListParams { page: 3, page_size: 20, ..Default::default() };
        assert_eq!(params.offset(), Ok(40));
    }

    #[test]
    fn offset_overflow_is_an_invalid_page() {
        let params = ListParams { page: i64::MAX, page_size: 10, ..Default::default() };
        assert!(matches!(params.offset(), Err(FilterError::InvalidPage(_))));
    }

    #[test]
    fn sort_direction_parses_case_insensitively() {
        assert_eq!(SortDirection::parse("DESC"), Ok(SortDirection::Desc));
        assert!(SortDirection::parse("sideways").is_err());
    }
}
