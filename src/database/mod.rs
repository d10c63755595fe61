pub mod manager;
pub mod models;
pub mod query_builder;
pub mod relations;
pub mod texts;

pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::QueryBuilder;
