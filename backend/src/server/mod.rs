//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::ServerSettings;

use state_builders::build_http_state;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};

use ebuddy_backend::Trace;
#[cfg(debug_assertions)]
use ebuddy_backend::doc::ApiDoc;
use ebuddy_backend::inbound::http::health::{HealthState, health, live, ready};
use ebuddy_backend::inbound::http::state::HttpState;
use ebuddy_backend::inbound::http::{api_scope, route_not_found};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors_origins: Arc<[String]>,
}

const CORS_MAX_AGE_SECS: usize = 3600;

/// Credentialed CORS for the configured browser origins.
///
/// Requests from other origins still reach the handlers; they simply get no
/// `Access-Control-Allow-*` headers back.
fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .block_on_origin_mismatch(false)
        .max_age(CORS_MAX_AGE_SECS)
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors_origins,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(cors(&cors_origins))
        .wrap(Trace)
        .service(api_scope())
        .service(health)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: validated [`ServerConfig`] naming the bind address and adapters.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener. OS signal
/// handling is left to the caller, which stops the server through its handle.
///
/// # Errors
/// Propagates [`std::io::Error`] when an adapter cannot be built or binding
/// the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        store,
        identity,
        cors_origins,
    } = config;
    let http_state = web::Data::new(build_http_state(store, identity)?);
    let cors_origins: Arc<[String]> = cors_origins.into();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors_origins: Arc::clone(&cors_origins),
        })
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
