use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use docshelf_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Caller role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
    Viewer,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Member => write!(f, "member"),
            Role::Viewer => write!(f, "viewer"),
        }
    }
}

impl Role {
    /// Parse a role claim value.
    pub fn parse(role_str: &str) -> Result<Role, AppError> {
        match role_str {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "viewer" => Ok(Role::Viewer),
            _ => Err(AppError::Unauthorized("Invalid caller role".to_string())),
        }
    }

    /// Whether this role carries the given permission.
    /// Admin holds everything, member reads and writes, viewer only reads.
    pub fn permits(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true,
            Role::Member => matches!(permission, Permission::Read | Permission::Write),
            Role::Viewer => matches!(permission, Permission::Read),
        }
    }
}

/// Operation permission classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Write,
    Delete,
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::Write => write!(f, "write"),
            Permission::Delete => write!(f, "delete"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: String, // "admin", "member", or "viewer"
    pub exp: i64,     // expiration timestamp
    pub iat: i64,     // issued at timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>, // not-before timestamp (optional)
}

/// Validated caller identity stored in request extensions by the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub subject: String,
    pub role: Role,
}

impl CallerIdentity {
    /// Deny the operation unless the caller's role carries `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.permits(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "{} role lacks the {} permission",
                self.role, permission
            )))
        }
    }
}

// Extract directly from request parts so handlers taking Multipart can still
// receive the identity.
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing caller identity".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_CALLER_IDENTITY".to_string(),
                        recoverable: false,
                        suggested_action: Some("Check authentication token".to_string()),
                    }),
                )
            })
    }
}
