//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the user data and health endpoints, the schema
//! wrappers from the inbound layer, and the bearer token security scheme.
//! The document backs Swagger UI in debug builds and is exported via
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::envelope::FailureEnvelope;
use crate::inbound::http::health::HealthSummary;
use crate::inbound::http::schemas::{ErrorCodeSchema, UserRecordSchema};
use crate::inbound::http::users::{UpdateUserDataBody, UserDataEnvelope};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Firebase ID token for the calling user."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "eBuddy backend API",
        description = "Per-user rental statistics behind bearer token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::update_user_data,
        crate::inbound::http::users::fetch_user_data,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserRecordSchema,
        ErrorCodeSchema,
        FailureEnvelope,
        UserDataEnvelope,
        UpdateUserDataBody,
        HealthSummary
    )),
    tags(
        (name = "users", description = "The caller's own user record"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
