//! Bearer-token authentication for the matching API.
//!
//! Tokens are HS256 JWTs issued by the account service with claims
//! `{ id, email, tipoUsuario, exp }`. The extractor re-reads the user so that
//! suspended accounts lose access before their token expires.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    #[serde(rename = "tipoUsuario")]
    pub user_type: String,
    pub exp: usize,
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Rejects callers whose account kind is not `role`.
    pub fn require_role(&self, role: UserRole, action: &str) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Only {} accounts can {action} (current: {})",
                role.as_str(),
                self.role.as_str()
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_claims(token, &state.config.jwt_secret)?;

        let user = state
            .repo
            .find_user(claims.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User for token no longer exists".into()))?;

        if !user.is_active() {
            return Err(AppError::Unauthorized(
                "Account is suspended or pending activation".into(),
            ));
        }

        if claims.user_type != user.user_type {
            debug!(
                "Token for {} carries role '{}', stored role is '{}'",
                claims.email, claims.user_type, user.user_type
            );
        }

        let role = user
            .role()
            .ok_or_else(|| AppError::Unauthorized(format!("Unknown account type '{}'", user.user_type)))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            role,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Expected 'Bearer <token>'".into()))
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".into()),
            _ => AppError::Unauthorized(format!("Invalid token: {err}")),
        })
}
