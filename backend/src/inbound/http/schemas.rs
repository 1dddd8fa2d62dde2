//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their domain counterparts field for field but live in
//! the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The record store or another dependency failed.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::UserRecord`].
#[derive(ToSchema)]
#[schema(as = UserRecord, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserRecordSchema {
    /// Identity of the record owner; never stored in the document body.
    #[schema(example = "u1")]
    id: String,
    /// Average weight rating on a 0 to 5 scale.
    #[schema(minimum = 0.0, maximum = 5.0, example = 4.8)]
    total_average_weight_ratings: f64,
    /// Completed rents.
    #[schema(minimum = 0, example = 10)]
    number_of_rents: u64,
    /// Last activity, epoch milliseconds.
    #[schema(example = 1_700_000_000_000_i64)]
    recently_active: i64,
    /// Creation time, epoch milliseconds.
    #[schema(example = 1_700_000_000_000_i64)]
    created_at: i64,
    /// Last write, epoch milliseconds.
    #[schema(example = 1_700_000_000_000_i64)]
    updated_at: i64,
}
