use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError};

/// Lifetime of an issued admin token.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claims
///
/// Payload of the HS256 tokens issued at login/register. Serialized as
/// `{userId, email, iat, exp}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    /// Issued At: seconds since the epoch.
    pub iat: usize,
    /// Expiration Time: checked on every request.
    pub exp: usize,
}

/// AuthUser
///
/// The principal resolved from a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// issue_token
///
/// Signs a token for `user_id` valid for `TOKEN_TTL_DAYS`.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// verify_token
///
/// Checks signature and expiry, returning the embedded principal.
pub fn verify_token(secret: &str, token: &str) -> Result<AuthUser, ApiError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::warn!(kind = ?e.kind(), "rejected bearer token");
        ApiError::InvalidToken
    })?;

    Ok(AuthUser {
        id: data.claims.user_id,
        email: data.claims.email,
    })
}

/// bearer_token
///
/// Extracts `<token>` from an `Authorization: Bearer <token>` header. Any other
/// shape (other scheme, extra segments, empty token) counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

/// Hashes a password into an Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Returns true when `password` matches the stored PHC string. A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

// Stand-in hash verified when the email is unknown.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("amarea-unknown-user").ok());

/// check_credentials
///
/// Verifies `password` against the stored hash of the account, if any. An absent
/// account still pays for one Argon2 verification, so both failure cases take the
/// same time.
pub fn check_credentials(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
                verify_password(password, hash);
            }
            false
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument (and by the admin route layer).
/// Rejects with "Token manquant" when no bearer token is present and with
/// "Token invalide" when the token fails verification; both are 401.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or(ApiError::MissingToken)?;

        verify_token(&config.jwt_secret, token)
    }
}
