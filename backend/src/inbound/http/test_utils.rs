//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{App, web};

use crate::domain::ports::{
    FixtureIdentityVerifier, FixtureUserDataCommand, FixtureUserDataQuery, IdentityVerifier,
    UserDataCommand, UserDataQuery,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::{api_scope, route_not_found};

/// Ports backed by fixtures; override fields to inject mocks.
pub fn fixture_ports() -> HttpStatePorts {
    HttpStatePorts {
        user_data: Arc::new(FixtureUserDataCommand),
        user_data_query: Arc::new(FixtureUserDataQuery),
        identity: Arc::new(FixtureIdentityVerifier),
    }
}

pub fn ports_with(
    user_data: impl UserDataCommand + 'static,
    user_data_query: impl UserDataQuery + 'static,
    identity: impl IdentityVerifier + 'static,
) -> HttpStatePorts {
    HttpStatePorts {
        user_data: Arc::new(user_data),
        user_data_query: Arc::new(user_data_query),
        identity: Arc::new(identity),
    }
}

/// Build an app serving the `/api` scope over `ports`.
pub fn test_app(
    ports: HttpStatePorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(ports)))
        .service(api_scope())
        .default_service(web::to(route_not_found))
}
