//! Firebase ID token verification.
//!
//! Tokens are RS256 JWTs signed by Google. Verification checks the signature
//! against Google's published JWKs plus the audience, issuer, expiry and
//! issued-at claims, then maps `sub` to the caller's [`UserId`].
//!
//! Signing keys are cached in memory until the `max-age` advertised by the key
//! endpoint elapses.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use mockable::Clock;
use reqwest::header::{CACHE_CONTROL, HeaderMap};
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::UserId;
use crate::domain::ports::{
    BearerToken, IdentityVerifier, IdentityVerifierError, VerifiedIdentity,
};

/// Google's JWK endpoint for Firebase ID token signing keys.
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_KEYS_TTL: Duration = Duration::from_secs(3600);
const ISSUED_AT_LEEWAY_SECS: i64 = 300;

/// Signing keys plus how long they may be cached.
#[derive(Debug, Clone)]
pub struct FetchedJwks {
    pub keys: JwkSet,
    /// Cache lifetime advertised by the source; `None` uses a one hour default.
    pub max_age: Option<Duration>,
}

/// Where [`FirebaseTokenVerifier`] obtains signing keys.
#[async_trait]
pub trait JwksSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedJwks, IdentityVerifierError>;
}

/// Fetches keys over HTTP, honouring `Cache-Control: max-age`.
pub struct HttpJwksSource {
    client: Client,
    url: Url,
}

impl HttpJwksSource {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl JwksSource for HttpJwksSource {
    async fn fetch(&self) -> Result<FetchedJwks, IdentityVerifierError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| IdentityVerifierError::unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityVerifierError::unavailable(format!(
                "signing key endpoint returned status {}",
                status.as_u16()
            )));
        }

        let max_age = max_age(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| IdentityVerifierError::unavailable(err.to_string()))?;
        let keys = serde_json::from_slice::<JwkSet>(&body).map_err(|err| {
            IdentityVerifierError::unavailable(format!("invalid signing key payload: {err}"))
        })?;
        debug!(keys = keys.keys.len(), ?max_age, "fetched firebase signing keys");
        Ok(FetchedJwks { keys, max_age })
    }
}

fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|directive| directive.trim().strip_prefix("max-age=")?.parse().ok())
        .map(Duration::from_secs)
}

/// A fixed key set, for emulators and tests.
#[derive(Debug, Clone)]
pub struct StaticJwksSource(JwkSet);

impl StaticJwksSource {
    pub fn new(keys: JwkSet) -> Self {
        Self(keys)
    }
}

#[async_trait]
impl JwksSource for StaticJwksSource {
    async fn fetch(&self) -> Result<FetchedJwks, IdentityVerifierError> {
        Ok(FetchedJwks {
            keys: self.0.clone(),
            max_age: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iat: i64,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    expires_at: DateTime<Utc>,
}

/// [`IdentityVerifier`] for Firebase ID tokens of one project.
pub struct FirebaseTokenVerifier<S> {
    source: S,
    clock: Arc<dyn Clock>,
    validation: Validation,
    cache: RwLock<Option<CachedKeys>>,
}

impl<S> FirebaseTokenVerifier<S>
where
    S: JwksSource,
{
    pub fn new(project_id: &str, source: S, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{project_id}")]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        Self {
            source,
            clock,
            validation,
            cache: RwLock::new(None),
        }
    }

    async fn signing_key(&self, kid: &str) -> Result<Jwk, IdentityVerifierError> {
        let now = self.clock.utc();
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|cached| cached.expires_at > now) {
                return cached
                    .keys
                    .find(kid)
                    .cloned()
                    .ok_or_else(|| IdentityVerifierError::invalid_token("unknown signing key"));
            }
        }

        let fetched = self.source.fetch().await?;
        let ttl = TimeDelta::from_std(fetched.max_age.unwrap_or(DEFAULT_KEYS_TTL))
            .unwrap_or_else(|_| TimeDelta::hours(1));
        let key = fetched.keys.find(kid).cloned();
        *self.cache.write().await = Some(CachedKeys {
            keys: fetched.keys,
            expires_at: now + ttl,
        });
        key.ok_or_else(|| IdentityVerifierError::invalid_token("unknown signing key"))
    }
}

#[async_trait]
impl<S> IdentityVerifier for FirebaseTokenVerifier<S>
where
    S: JwksSource,
{
    async fn verify(&self, token: &BearerToken) -> Result<VerifiedIdentity, IdentityVerifierError> {
        let header = decode_header(token.as_str()).map_err(map_jwt_error)?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityVerifierError::invalid_token(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityVerifierError::invalid_token("token has no key id"))?;

        let jwk = self.signing_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|err| {
            warn!(kid = %kid, error = %err, "unusable firebase signing key");
            IdentityVerifierError::unavailable(format!("unusable signing key {kid}"))
        })?;
        let claims = decode::<FirebaseClaims>(token.as_str(), &key, &self.validation)
            .map_err(map_jwt_error)?
            .claims;

        if claims.iat > self.clock.utc().timestamp() + ISSUED_AT_LEEWAY_SECS {
            return Err(IdentityVerifierError::invalid_token("token issued in the future"));
        }

        let user_id = UserId::new(claims.sub)
            .map_err(|err| IdentityVerifierError::invalid_token(format!("invalid subject: {err}")))?;
        let identity = VerifiedIdentity::new(user_id);
        Ok(match claims.email {
            Some(email) => identity.with_email(email),
            None => identity,
        })
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> IdentityVerifierError {
    IdentityVerifierError::invalid_token(error.to_string())
}

#[cfg(test)]
#[path = "firebase_tests.rs"]
mod tests;
