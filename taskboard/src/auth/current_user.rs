//! Request identity extraction from bearer tokens.
//!
//! Protected handlers take [`AuthenticatedUser`] as a parameter, so the
//! identity is always explicit in the handler signature rather than read from
//! ambient request state.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

use crate::{
    AppState,
    auth::token,
    errors::{Error, Result},
    types::UserId,
};

/// The identity carried by a verified access token.
///
/// Individual claims may be absent: a token whose subject is not a numeric
/// user id still authenticates, but carries no `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Option<UserId>,
    pub email: String,
    pub full_name: String,
}

impl AuthenticatedUser {
    /// The user id, or an authentication error when the token does not
    /// identify a known user.
    pub fn require_user_id(&self) -> Result<UserId> {
        self.user_id.ok_or(Error::Unauthenticated {
            message: Some("Token does not identify a user".to_string()),
        })
    }
}

/// Extract the bearer token from the Authorization header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Error;

    /// Missing or non-bearer credentials reject with 401; a bearer token that
    /// fails verification rejects with 403 (see [`Error::InvalidToken`]).
    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(token) = bearer_token(parts) else {
            trace!("No bearer credentials found in request");
            return Err(Error::Unauthenticated { message: None });
        };

        token::verify_access_token(token, &state.config)
    }
}

/// Optional identity: carries the user when a valid bearer token is present,
/// and never rejects the request.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match bearer_token(parts) {
            None => Ok(MaybeUser(None)),
            Some(token) => Ok(MaybeUser(token::verify_access_token(token, &state.config).ok())),
        }
    }
}
