//! Domain primitives, ports, and services.
//!
//! Purpose: define the user record entity, the rules that guard its two
//! mutable fields, and the service that orchestrates fetch and update over
//! the record store port. Nothing in here depends on actix-web or on a
//! concrete store client.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserId / UserRecord / RentalStats: the per-user document and its fields.
//! - validation: `is_valid_rating` and `is_valid_rent_count` predicates.
//! - UserDataService: implements the user data driving ports.
//! - TraceId: request-scoped correlation identifier.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user_data_service;
pub mod user_record;
pub mod validation;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user_data_service::UserDataService;
pub use self::user_record::{
    EpochMillis, RentalStats, RentalStatsValidationError, UserId, UserIdValidationError,
    UserRecord, epoch_millis,
};
pub use self::validation::{MAX_RATING, MAX_RENT_COUNT, is_valid_rating, is_valid_rent_count};
