//! Builders turning validated store and identity settings into HTTP state.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::info;

use ebuddy_backend::domain::UserDataService;
use ebuddy_backend::domain::ports::{
    IdentityVerifier, UserDataCommand, UserDataQuery, UserRecordRepository,
};
use ebuddy_backend::inbound::http::state::{HttpState, HttpStatePorts};
use ebuddy_backend::outbound::InMemoryUserRecordRepository;
use ebuddy_backend::outbound::firestore::FirestoreUserRecordRepository;
use ebuddy_backend::outbound::identity::{
    DevTokenVerifier, FirebaseTokenVerifier, GOOGLE_JWKS_URL, HttpJwksSource,
};

use super::config::{IdentityConfig, StoreConfig};

const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

type UserDataPorts = (Arc<dyn UserDataCommand>, Arc<dyn UserDataQuery>);

fn user_data_ports<R>(repo: R) -> UserDataPorts
where
    R: UserRecordRepository + 'static,
{
    let service = Arc::new(UserDataService::new(Arc::new(repo)));
    (
        service.clone() as Arc<dyn UserDataCommand>,
        service as Arc<dyn UserDataQuery>,
    )
}

fn build_user_data(store: StoreConfig, clock: Arc<dyn Clock>) -> std::io::Result<UserDataPorts> {
    match store {
        StoreConfig::Memory => {
            info!("using in-memory user record store");
            Ok(user_data_ports(InMemoryUserRecordRepository::new(clock)))
        }
        StoreConfig::Firestore(config) => {
            info!(
                project_id = %config.project_id,
                base_url = %config.base_url,
                "using firestore user record store"
            );
            let repo = FirestoreUserRecordRepository::new(config, clock)
                .map_err(|err| std::io::Error::other(format!("firestore setup failed: {err}")))?;
            Ok(user_data_ports(repo))
        }
    }
}

fn build_identity(
    identity: IdentityConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn IdentityVerifier>> {
    match identity {
        IdentityConfig::Dev => Ok(Arc::new(DevTokenVerifier)),
        IdentityConfig::Firebase { project_id } => {
            let url = Url::parse(GOOGLE_JWKS_URL)
                .map_err(|err| std::io::Error::other(format!("invalid JWKS URL: {err}")))?;
            let source = HttpJwksSource::new(url, JWKS_FETCH_TIMEOUT)
                .map_err(|err| std::io::Error::other(format!("JWKS client setup failed: {err}")))?;
            info!(project_id = %project_id, "verifying firebase ID tokens");
            Ok(Arc::new(FirebaseTokenVerifier::new(&project_id, source, clock)))
        }
    }
}

/// Build the shared HTTP state from the configured adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when an outbound client cannot be constructed.
pub fn build_http_state(
    store: StoreConfig,
    identity: IdentityConfig,
) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (user_data, user_data_query) = build_user_data(store, clock.clone())?;
    let identity = build_identity(identity, clock)?;
    Ok(HttpState::new(HttpStatePorts {
        user_data,
        user_data_query,
        identity,
    }))
}
