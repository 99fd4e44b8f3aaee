use crate::auth::jwks::JwksClient;
use crate::auth::models::{CallerIdentity, JwtClaims, Role};
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use docshelf_core::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// State for the bearer-token middleware.
///
/// Three acceptance paths, checked in order: the configured service API key
/// (constant-time compare, admin identity), an asymmetric JWT validated
/// against the identity provider's JWKS, and an HS256 JWT validated against
/// the shared secret.
#[derive(Clone)]
pub struct AuthState {
    pub service_api_key: Option<String>,
    pub jwt_secret: String,
    pub jwks: Option<Arc<JwksClient>>,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    if !auth_header.starts_with("Bearer ") {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    }

    let token = &auth_header[7..]; // Remove "Bearer " prefix

    if let Some(ref service_key) = auth_state.service_api_key {
        if secure_compare(token, service_key) {
            request.extensions_mut().insert(CallerIdentity {
                subject: "service".to_string(),
                role: Role::Admin,
            });
            return next.run(request).await;
        }
    }

    match authenticate_token(token, &auth_state).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

/// Validate a JWT and extract the caller identity. The token's own header
/// picks the path: asymmetric algorithms go through the JWKS client,
/// HS256 through the shared secret.
async fn authenticate_token(
    token: &str,
    auth_state: &AuthState,
) -> Result<CallerIdentity, AppError> {
    let header = jsonwebtoken::decode_header(token)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {}", e)))?;

    let claims = match header.alg {
        Algorithm::HS256 => validate_hs256(token, &auth_state.jwt_secret)?,
        Algorithm::RS256 | Algorithm::ES256 => match auth_state.jwks {
            Some(ref jwks) => jwks.validate_token(token).await?,
            None => {
                return Err(AppError::Unauthorized(
                    "Asymmetric tokens are not configured (IDP_JWKS_URL unset)".to_string(),
                ));
            }
        },
        other => {
            return Err(AppError::Unauthorized(format!(
                "Unsupported token algorithm: {:?}",
                other
            )));
        }
    };

    let role = Role::parse(&claims.role)?;
    Ok(CallerIdentity {
        subject: claims.sub,
        role,
    })
}

fn validate_hs256(token: &str, secret: &str) -> Result<JwtClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token has expired".to_string())
        }
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
            AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
        }
        _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn auth_state() -> AuthState {
        AuthState {
            service_api_key: Some("svc-key-0123456789abcdef0123456789".to_string()),
            jwt_secret: SECRET.to_string(),
            jwks: None,
        }
    }

    fn mint(role: &str, exp_offset_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: "user-1".to_string(),
            role: role.to_string(),
            exp: now + exp_offset_secs,
            iat: now,
            nbf: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_hs256_token() {
        let token = mint("member", 3600);
        let identity = authenticate_token(&token, &auth_state()).await.unwrap();
        assert_eq!(identity.subject, "user-1");
        assert_eq!(identity.role, Role::Member);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token = mint("member", -3600);
        let err = authenticate_token(&token, &auth_state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let token = mint("superuser", 3600);
        let err = authenticate_token(&token, &auth_state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = JwtClaims {
            sub: "user-1".to_string(),
            role: "admin".to_string(),
            exp: now + 3600,
            iat: now,
            nbf: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"a-completely-different-secret!!!"),
        )
        .unwrap();
        let err = authenticate_token(&token, &auth_state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_asymmetric_token_without_jwks_rejected() {
        // base64url of {"alg":"RS256","typ":"JWT"} with an empty body; enough
        // to reach the configuration check.
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.e30.sig";
        let err = authenticate_token(token, &auth_state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }
}
