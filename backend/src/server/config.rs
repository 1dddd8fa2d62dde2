//! HTTP server configuration object.

use std::net::SocketAddr;

use ebuddy_backend::outbound::firestore::FirestoreConfig;

/// Which record store adapter backs the user data service.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Process-local map; data is lost on restart.
    Memory,
    Firestore(FirestoreConfig),
}

/// Which identity verifier resolves bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityConfig {
    /// Verify Firebase ID tokens issued for `project_id`.
    Firebase { project_id: String },
    /// Accept `dev:<uid>` tokens without verification.
    Dev,
}

/// Validated configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: StoreConfig,
    pub(crate) identity: IdentityConfig,
    pub(crate) cors_origins: Vec<String>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, store: StoreConfig, identity: IdentityConfig) -> Self {
        Self {
            bind_addr,
            store,
            identity,
            cors_origins: Vec::new(),
        }
    }

    /// Browser origins allowed to call the API with credentials.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by settings tests; wiring destructures the config")
    )]
    #[must_use]
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by settings tests; wiring destructures the config")
    )]
    #[must_use]
    pub fn identity(&self) -> &IdentityConfig {
        &self.identity
    }

    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by settings tests; wiring destructures the config")
    )]
    #[must_use]
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }
}
