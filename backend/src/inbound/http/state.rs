//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{IdentityVerifier, UserDataCommand, UserDataQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub user_data: Arc<dyn UserDataCommand>,
    pub user_data_query: Arc<dyn UserDataQuery>,
    pub identity: Arc<dyn IdentityVerifier>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub user_data: Arc<dyn UserDataCommand>,
    pub user_data_query: Arc<dyn UserDataQuery>,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use ebuddy_backend::domain::ports::{
    ///     FixtureIdentityVerifier, FixtureUserDataCommand, FixtureUserDataQuery,
    /// };
    /// use ebuddy_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     user_data: Arc::new(FixtureUserDataCommand),
    ///     user_data_query: Arc::new(FixtureUserDataQuery),
    ///     identity: Arc::new(FixtureIdentityVerifier),
    /// });
    /// let _identity = state.identity.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            user_data,
            user_data_query,
            identity,
        } = ports;
        Self {
            user_data,
            user_data_query,
            identity,
        }
    }
}
