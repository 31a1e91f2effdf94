pub mod auth;
pub mod permission;
pub mod response;

pub use auth::{session_middleware, AuthUser};
pub use permission::{require_permission, ResourceGuard};
pub use response::{ApiResponse, ApiResult};
