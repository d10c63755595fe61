use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter field '{field}' for {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Invalid sort field '{field}' for {entity}")]
    UnknownSortField { entity: String, field: String },

    #[error("Unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid value '{value}' for filter '{field}': expected an integer id")]
    InvalidRelationValue { field: String, value: String },

    #[error("Invalid sort order '{0}': expected 'asc' or 'desc'")]
    InvalidSortOrder(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Filter arrays are mismatched: {0}")]
    MismatchedArrays(String),
}
