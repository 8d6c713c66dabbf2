pub mod auth;
pub mod authorize;
pub mod response;

pub use auth::{authenticate_jwt, AuthUser};
pub use authorize::{AdminUser, SelfOrAdmin};
pub use response::{ApiResponse, ApiResult};
