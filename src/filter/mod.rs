pub mod error;
pub mod fields;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod params;
pub mod types;

pub use error::FilterError;
pub use fields::EntitySchema;
pub use filter::Filter;
pub use params::ListQuery;
pub use types::*;
