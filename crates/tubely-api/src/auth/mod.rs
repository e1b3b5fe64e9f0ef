//! Bearer-token authentication and ownership checks

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{extract_bearer_token, issue_access_token, validate_access_token};
pub use middleware::auth_middleware;
pub use models::{ensure_owner, AuthUser};
