//! Authentication and authorization boundary.
//!
//! Docshelf never issues tokens; it validates bearer credentials handed to
//! it and extracts a caller identity with a role. Token issuance and user
//! management belong to the external identity provider.

pub mod jwks;
pub mod middleware;
pub mod models;

pub use jwks::JwksClient;
pub use middleware::{auth_middleware, AuthState};
pub use models::{CallerIdentity, JwtClaims, Permission, Role};
