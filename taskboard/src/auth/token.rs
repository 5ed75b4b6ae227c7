//! JWT access token creation and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::current_user::AuthenticatedUser, config::Config, errors::Error, types::UserId};

/// JWT access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,   // Subject (user ID, stringified)
    pub email: String, // User email
    pub name: String,  // Full name
    pub jti: Uuid,     // Unique token id
    pub iss: String,   // Issuer
    pub aud: String,   // Audience
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

impl AccessClaims {
    /// Create new access claims for a user
    pub fn new(user_id: UserId, email: &str, full_name: &str, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.token.expiry;

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: full_name.to_string(),
            jti: Uuid::new_v4(),
            iss: config.auth.token.issuer.clone(),
            aud: config.auth.token.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            // A non-numeric subject yields an identity without a user id
            user_id: claims.sub.parse::<UserId>().ok(),
            email: claims.email,
            full_name: claims.name,
        }
    }
}

/// Create a signed JWT access token for a user
pub fn issue_access_token(user_id: UserId, email: &str, full_name: &str, config: &Config) -> Result<String, Error> {
    let claims = AccessClaims::new(user_id, email, full_name, config);
    let secret = config.auth.token.secret.as_ref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: auth.token.secret is required".to_string(),
    })?;

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode a JWT access token.
///
/// Issuer and audience must match the configured values and expiry is checked
/// with zero clock leeway.
pub fn verify_access_token(token: &str, config: &Config) -> Result<AuthenticatedUser, Error> {
    let secret = config.auth.token.secret.as_ref().ok_or_else(|| Error::Internal {
        operation: "JWT tokens: auth.token.secret is required".to_string(),
    })?;

    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.auth.token.issuer]);
    validation.set_audience(&[&config.auth.token.audience]);
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::InvalidToken,

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

    Ok(AuthenticatedUser::from(token_data.claims))
}
