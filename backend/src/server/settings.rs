//! Server settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `EBUDDY_*` environment variables and an
//! optional config file. [`ServerSettings::into_config`] validates the
//! combination and resolves defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use ebuddy_backend::outbound::firestore::{DEFAULT_FIRESTORE_BASE_URL, FirestoreConfig};

use super::config::{IdentityConfig, ServerConfig, StoreConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_FIRESTORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5000";

/// Raw configuration values controlling the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EBUDDY")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Record store backend: `memory` or `firestore`.
    pub store: Option<String>,
    /// Google Cloud project holding the `USERS` collection.
    pub firestore_project_id: Option<String>,
    /// Firestore REST root; point at the emulator for local runs.
    pub firestore_base_url: Option<String>,
    /// OAuth bearer token for Firestore REST calls.
    pub firestore_access_token: Option<String>,
    /// Per-request timeout for Firestore calls.
    pub firestore_timeout_secs: Option<u64>,
    /// Firebase project whose ID tokens are accepted.
    pub firebase_project_id: Option<String>,
    /// Comma-separated browser origins allowed to call the API.
    pub cors_allowed_origins: Option<String>,
    /// Accept `dev:<uid>` tokens. Honoured in debug builds only.
    #[ortho_config(default = false)]
    pub allow_dev_tokens: bool,
}

/// Reasons a settings combination cannot start the server.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("bind address {value} is not a socket address")]
    InvalidBindAddr { value: String },
    #[error("unknown store {value}; expected memory or firestore")]
    UnknownStore { value: String },
    #[error("firestore store requires EBUDDY_FIRESTORE_PROJECT_ID")]
    MissingFirestoreProject,
    #[error("firestore base URL {value} is not a valid URL")]
    InvalidFirestoreUrl { value: String },
    #[error("token verification requires EBUDDY_FIREBASE_PROJECT_ID or EBUDDY_FIRESTORE_PROJECT_ID")]
    MissingFirebaseProject,
    #[error("development tokens are refused in release builds")]
    DevTokensInRelease,
    #[error("CORS origin {value} must be an http or https origin")]
    InvalidCorsOrigin { value: String },
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl ServerSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        non_blank(self.bind_addr.as_deref()).unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured store name, falling back to `memory`.
    pub fn store(&self) -> &str {
        non_blank(self.store.as_deref()).unwrap_or("memory")
    }

    pub fn firestore_base_url(&self) -> &str {
        non_blank(self.firestore_base_url.as_deref()).unwrap_or(DEFAULT_FIRESTORE_BASE_URL)
    }

    pub fn firestore_timeout(&self) -> Duration {
        Duration::from_secs(
            self.firestore_timeout_secs
                .unwrap_or(DEFAULT_FIRESTORE_TIMEOUT_SECS),
        )
    }

    /// Return the configured CORS origins, falling back to the local frontends.
    pub fn cors_allowed_origins(&self) -> &str {
        non_blank(self.cors_allowed_origins.as_deref()).unwrap_or(DEFAULT_CORS_ORIGINS)
    }

    /// Token audience, falling back to the Firestore project.
    pub fn firebase_project_id(&self) -> Option<&str> {
        non_blank(self.firebase_project_id.as_deref())
            .or_else(|| non_blank(self.firestore_project_id.as_deref()))
    }

    fn store_config(&self) -> Result<StoreConfig, SettingsError> {
        match self.store() {
            "memory" => Ok(StoreConfig::Memory),
            "firestore" => {
                let project_id = non_blank(self.firestore_project_id.as_deref())
                    .ok_or(SettingsError::MissingFirestoreProject)?;
                let base_url = self.firestore_base_url();
                let base_url =
                    Url::parse(base_url).map_err(|_| SettingsError::InvalidFirestoreUrl {
                        value: base_url.to_owned(),
                    })?;
                Ok(StoreConfig::Firestore(FirestoreConfig {
                    base_url,
                    project_id: project_id.to_owned(),
                    access_token: non_blank(self.firestore_access_token.as_deref())
                        .map(str::to_owned),
                    timeout: self.firestore_timeout(),
                }))
            }
            other => Err(SettingsError::UnknownStore {
                value: other.to_owned(),
            }),
        }
    }

    fn cors_origins(&self) -> Result<Vec<String>, SettingsError> {
        self.cors_allowed_origins()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                Url::parse(origin)
                    .ok()
                    .filter(|url| matches!(url.scheme(), "http" | "https"))
                    .map(|url| url.origin().ascii_serialization())
                    .ok_or_else(|| SettingsError::InvalidCorsOrigin {
                        value: origin.to_owned(),
                    })
            })
            .collect()
    }

    fn identity_config(&self, debug_build: bool) -> Result<IdentityConfig, SettingsError> {
        if self.allow_dev_tokens {
            if !debug_build {
                return Err(SettingsError::DevTokensInRelease);
            }
            warn!("accepting development tokens; never enable this in production");
            return Ok(IdentityConfig::Dev);
        }
        let project_id = self
            .firebase_project_id()
            .ok_or(SettingsError::MissingFirebaseProject)?;
        Ok(IdentityConfig::Firebase {
            project_id: project_id.to_owned(),
        })
    }

    /// Validate the settings into a [`ServerConfig`].
    pub fn into_config(self) -> Result<ServerConfig, SettingsError> {
        self.into_config_for_build(cfg!(debug_assertions))
    }

    fn into_config_for_build(self, debug_build: bool) -> Result<ServerConfig, SettingsError> {
        let raw_addr = self.bind_addr();
        let bind_addr: SocketAddr =
            raw_addr
                .parse()
                .map_err(|_| SettingsError::InvalidBindAddr {
                    value: raw_addr.to_owned(),
                })?;
        let store = self.store_config()?;
        let identity = self.identity_config(debug_build)?;
        let cors_origins = self.cors_origins()?;
        Ok(ServerConfig::new(bind_addr, store, identity).with_cors_origins(cors_origins))
    }
}
