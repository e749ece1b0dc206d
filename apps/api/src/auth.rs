//! JWT authentication for the sale routes.
//!
//! Tokens are issued by the identity service that owns login; this server
//! only verifies them. [`JwtManager::issue_token`] exists for operator
//! tooling and tests, signing with the same shared secret.
//!
//! ## Request Flow
//! ```text
//! Authorization: Bearer <token>
//!        │
//!        ▼
//! require_auth middleware ── verify signature + expiry (HS256)
//!        │
//!        ▼
//! Claims { sub, username, role, iat, exp }
//!        │
//!        ▼
//! AuthUser inserted into request extensions, handlers read the role
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use lotus_core::Role;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    /// Username at issue time.
    pub username: String,
    /// Role token, "ADMIN" or "EMPLOYEE".
    pub role: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Resolves the typed caller identity from the raw claims.
    pub fn auth_user(&self) -> Result<AuthUser, ApiError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| ApiError::Unauthorized(format!("Unknown role: {}", self.role)))?;

        Ok(AuthUser {
            user_id: self.sub,
            username: self.username.clone(),
            role,
        })
    }
}

/// The authenticated caller, read from request extensions by handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Signs and verifies JWT tokens (HS256).
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    expiry_hours: i64,
}

impl JwtManager {
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        JwtManager {
            secret,
            expiry_hours,
        }
    }

    /// Issues a token for a user.
    ///
    /// Production tokens come from the identity service; this signs with
    /// the shared secret for tooling and tests.
    pub fn issue_token(&self, user_id: i64, username: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.expiry_hours);

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Storage(format!("Failed to sign token: {}", e)))
    }

    /// Verifies a token's signature and expiry, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extracts the bearer token from an Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    if auth_header.starts_with("Bearer ") {
        Some(&auth_header[7..])
    } else {
        None
    }
}

/// Middleware guarding the sale routes.
///
/// Rejects requests without a valid bearer token and stores the resolved
/// [`AuthUser`] in request extensions for handlers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = extract_bearer_token(header_value)
        .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

    let claims = state.jwt.verify_token(token)?;
    let user = claims.auth_user()?;

    debug!(user_id = user.user_id, username = %user.username, "Request authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret".to_string(), 24)
    }

    #[test]
    fn test_token_roundtrip() {
        let jwt = manager();
        let token = jwt.issue_token(7, "reception", Role::Employee).unwrap();
        let claims = jwt.verify_token(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "reception");
        assert_eq!(claims.role, "EMPLOYEE");
        assert!(claims.exp > claims.iat);

        let user = claims.auth_user().unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.role, Role::Employee);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = manager().issue_token(1, "admin", Role::Admin).unwrap();

        let other = JwtManager::new("different-secret".to_string(), 24);
        let err = other.verify_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expiry two hours in the past clears the default 60s leeway.
        let jwt = JwtManager::new("test-secret".to_string(), -2);
        let token = jwt.issue_token(1, "admin", Role::Admin).unwrap();

        let err = jwt.verify_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = manager().verify_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let claims = Claims {
            sub: 1,
            username: "ghost".to_string(),
            role: "SUPERUSER".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        let err = claims.auth_user().unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}
