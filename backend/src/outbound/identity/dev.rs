//! Development-only bearer scheme.
//!
//! Tokens of the form `dev:<uid>` authenticate as `<uid>` without any
//! signature. The server only wires this verifier into debug builds.

use async_trait::async_trait;

use crate::domain::UserId;
use crate::domain::ports::{
    BearerToken, IdentityVerifier, IdentityVerifierError, VerifiedIdentity,
};

pub const DEV_TOKEN_PREFIX: &str = "dev:";

#[derive(Debug, Default, Clone, Copy)]
pub struct DevTokenVerifier;

#[async_trait]
impl IdentityVerifier for DevTokenVerifier {
    async fn verify(&self, token: &BearerToken) -> Result<VerifiedIdentity, IdentityVerifierError> {
        let uid = token
            .as_str()
            .strip_prefix(DEV_TOKEN_PREFIX)
            .ok_or_else(|| IdentityVerifierError::invalid_token("not a development token"))?;
        UserId::new(uid)
            .map(VerifiedIdentity::new)
            .map_err(|err| IdentityVerifierError::invalid_token(err.to_string()))
    }
}
