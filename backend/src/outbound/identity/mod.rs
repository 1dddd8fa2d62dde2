//! Identity verifier adapters.
//!
//! - [`FirebaseTokenVerifier`]: production verifier for Firebase ID tokens.
//! - [`DevTokenVerifier`]: accepts `dev:<uid>` tokens for local runs only.

mod dev;
mod firebase;

pub use dev::{DEV_TOKEN_PREFIX, DevTokenVerifier};
pub use firebase::{
    FetchedJwks, FirebaseTokenVerifier, GOOGLE_JWKS_URL, HttpJwksSource, JwksSource,
    StaticJwksSource,
};
