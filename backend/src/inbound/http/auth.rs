//! Bearer authentication for HTTP handlers.
//!
//! Handlers take an [`AuthenticatedUser`] argument; the extractor reads the
//! `Authorization` header, asks the configured [`IdentityVerifier`] to
//! resolve it, and rejects the request before the handler body runs.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error};

use crate::domain::ports::{BearerToken, IdentityVerifier, IdentityVerifierError};
use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";
pub(crate) const TOKEN_REQUIRED_MESSAGE: &str = "Authorization token required";
pub(crate) const TOKEN_REJECTED_MESSAGE: &str = "Invalid or expired token";

/// Identity of the caller, resolved from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
    email: Option<String>,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<BearerToken, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized(TOKEN_REQUIRED_MESSAGE))?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized(TOKEN_REQUIRED_MESSAGE))?;
    Ok(BearerToken::new(token))
}

fn map_verifier_error(err: IdentityVerifierError) -> Error {
    match err {
        IdentityVerifierError::InvalidToken { message } => {
            debug!(reason = %message, "bearer token rejected");
            Error::unauthorized(TOKEN_REJECTED_MESSAGE)
        }
        IdentityVerifierError::Unavailable { message } => {
            error!(reason = %message, "identity verifier unavailable");
            Error::internal("Internal server error during authentication")
        }
    }
}

/// Verify `token` with `verifier` and map failures to HTTP-facing errors.
pub(crate) async fn authenticate(
    verifier: &dyn IdentityVerifier,
    token: &BearerToken,
) -> Result<AuthenticatedUser, Error> {
    let identity = verifier.verify(token).await.map_err(map_verifier_error)?;
    Ok(AuthenticatedUser {
        user_id: identity.user_id,
        email: identity.email,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| {
                error!("HttpState missing from app data");
                Error::internal("Internal server error during authentication")
            })?;
            authenticate(state.identity.as_ref(), &token).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixtureIdentityVerifier, MockIdentityVerifier};
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    #[case(Some("Bearer    "))]
    #[case(Some("bearer u1"))]
    fn unusable_headers_require_a_token(#[case] header: Option<&str>) {
        let mut request = TestRequest::default();
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }

        let err = bearer_token(&request.to_http_request()).expect_err("no usable token");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), TOKEN_REQUIRED_MESSAGE);
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let request = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();

        let token = bearer_token(&request).expect("token");

        assert_eq!(token.as_str(), "abc.def.ghi");
    }

    fn accepting_verifier() -> FixtureIdentityVerifier {
        FixtureIdentityVerifier
    }

    fn unavailable_verifier() -> MockIdentityVerifier {
        let mut verifier = MockIdentityVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(IdentityVerifierError::unavailable("jwks fetch timed out")));
        verifier
    }

    async fn the_token_is_authenticated(
        verifier: &dyn IdentityVerifier,
        token: &str,
    ) -> Result<AuthenticatedUser, Error> {
        authenticate(verifier, &BearerToken::new(token)).await
    }

    fn the_error_has_code(result: Result<AuthenticatedUser, Error>, code: ErrorCode) {
        let err = result.expect_err("authentication should fail");
        assert_eq!(err.code(), code);
    }

    #[tokio::test]
    async fn accepted_tokens_resolve_to_the_user() {
        let verifier = accepting_verifier();
        let user = the_token_is_authenticated(&verifier, "u1")
            .await
            .expect("authenticated");
        assert_eq!(user.user_id().as_ref(), "u1");
        assert_eq!(user.email(), None);
    }

    #[tokio::test]
    async fn rejected_tokens_are_unauthorised() {
        let verifier = accepting_verifier();
        let result = the_token_is_authenticated(&verifier, "not/a/uid").await;
        the_error_has_code(result.clone(), ErrorCode::Unauthorized);
        assert_eq!(
            result.expect_err("rejected").message(),
            TOKEN_REJECTED_MESSAGE
        );
    }

    #[tokio::test]
    async fn verifier_outages_are_internal_errors() {
        let verifier = unavailable_verifier();
        let result = the_token_is_authenticated(&verifier, "u1").await;
        the_error_has_code(result, ErrorCode::InternalError);
    }
}
