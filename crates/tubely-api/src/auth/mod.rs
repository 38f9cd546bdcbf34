pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtService;
pub use middleware::auth_middleware;
pub use models::AuthUser;
