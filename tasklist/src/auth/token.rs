//! JWT bearer token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{api::models::users::CurrentUser, config::Config, errors::Error, types::UserId};

/// JWT claims carried by a bearer token.
///
/// Tokens hold only the user id and admin flag; the rest of the user record is
/// re-resolved from the database on every request, so a token issued before a
/// user was deleted cannot resurrect them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: UserId, // Subject (user ID)
    pub is_admin: bool,  // Admin flag
    pub exp: i64,        // Expiration time
    pub iat: i64,        // Issued at
}

impl TokenClaims {
    /// Create new claims for a user, expiring `ttl` from now.
    pub fn new(user_id: UserId, is_admin: bool, ttl: chrono::Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            is_admin,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Create a signed JWT for a user
pub fn create_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let ttl = chrono::Duration::from_std(config.auth.token_ttl).map_err(|e| Error::Internal {
        operation: format!("token ttl out of range: {e}"),
    })?;
    let claims = TokenClaims::new(user.id, user.is_admin, ttl);
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: secret_key is required".to_string(),
    })?;

    let key = EncodingKey::from_secret(secret_key.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode a JWT bearer token.
///
/// Every client-side failure (malformed, bad signature, expired, wrong
/// algorithm) collapses into one Unauthenticated error; callers cannot tell
/// the causes apart.
pub fn verify_token(token: &str, config: &Config) -> Result<TokenClaims, Error> {
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: secret_key is required".to_string(),
    })?;

    let key = DecodingKey::from_secret(secret_key.as_bytes());
    let mut validation = Validation::default();
    // No grace period: a token past its expiry is rejected on the next request
    validation.leeway = 0;

    let token_data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated {
            message: Some("Token is invalid or expired".to_string()),
        },

        // Server errors (500) - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
        | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
        | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
        | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        // Catch-all for any future error variants (default to server error for safety)
        _ => Error::Internal {
            operation: format!("JWT verification (unknown error): {e}"),
        },
    })?;

    Ok(token_data.claims)
}
