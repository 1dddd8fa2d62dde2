//! HTTP inbound adapter exposing REST endpoints.
//!
//! ```text
//! PATCH /api/users/update-user-data
//! GET   /api/users/fetch-user-data
//! GET   /health, /health/ready, /health/live
//! ```

use actix_web::{Scope, web};

pub mod auth;
pub mod cache_control;
pub mod envelope;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::{ApiResult, json_error_handler, route_not_found};

/// The `/api` scope with the user data endpoints and JSON error handling.
///
/// Callers must register `web::Data<HttpState>` on the app.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(users::update_user_data)
        .service(users::fetch_user_data)
}
