pub mod auth;
pub mod response;
pub mod timeout;

pub use auth::{auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use timeout::timeout_middleware;
