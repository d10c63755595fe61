pub mod actor;
pub mod json;
pub mod response;

pub use actor::Actor;
pub use json::AppJson;
pub use response::{ApiResponse, ApiResult};
