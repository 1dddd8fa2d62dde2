//! Port for resolving a bearer token to an authenticated identity.

use std::fmt;

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

/// Raw bearer token taken from the `Authorization` header.
///
/// `Debug` is redacted so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Identity proven by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl VerifiedIdentity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

define_port_error! {
    /// Errors raised by identity verifier adapters.
    pub enum IdentityVerifierError {
        /// The token is malformed, expired, or signed by an unknown key.
        InvalidToken { message: String } => "invalid token: {message}",
        /// Verification could not run, e.g. signing keys were unreachable.
        Unavailable { message: String } => "identity verification unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the identity it proves.
    async fn verify(&self, token: &BearerToken) -> Result<VerifiedIdentity, IdentityVerifierError>;
}

/// Fixture verifier that treats the token text as the user id.
///
/// Tokens that are not a valid [`UserId`] are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityVerifier;

#[async_trait]
impl IdentityVerifier for FixtureIdentityVerifier {
    async fn verify(&self, token: &BearerToken) -> Result<VerifiedIdentity, IdentityVerifierError> {
        UserId::new(token.as_str())
            .map(VerifiedIdentity::new)
            .map_err(|err| IdentityVerifierError::invalid_token(err.to_string()))
    }
}
