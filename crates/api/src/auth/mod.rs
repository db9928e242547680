// Organizer authentication

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::{AuthConfig, AuthMode};
pub use jwt::JwtService;
pub use middleware::{AuthError, AuthState, AuthUser, FromRef};
