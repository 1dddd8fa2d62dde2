//! Driving port for updating a user's rental stats.
//!
//! HTTP handlers call [`UserDataCommand`] with raw numeric input; the
//! implementation validates it before anything reaches the store.

use async_trait::async_trait;

use crate::domain::{Error, RentalStats, UserId, UserRecord};

/// Request to overwrite the caller's rental stats.
///
/// The numeric fields are unvalidated so that every caller goes through the
/// same validation path in the service.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateUserDataRequest {
    /// The authenticated caller.
    pub user_id: UserId,
    /// Average weight rating, expected within `0..=5`.
    pub total_average_weight_ratings: f64,
    /// Rent count, expected to be a non-negative integer.
    pub number_of_rents: f64,
}

/// Domain use-case port for the update flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDataCommand: Send + Sync {
    /// Validate the request, then create or merge the caller's record.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::InvalidRequest`](crate::domain::ErrorCode::InvalidRequest)
    ///   when either field fails validation. No store call is made.
    /// - [`ErrorCode::InternalError`](crate::domain::ErrorCode::InternalError)
    ///   when the store fails.
    async fn update_user_data(&self, request: UpdateUserDataRequest) -> Result<UserRecord, Error>;
}

/// Fixture command that echoes the request back as a freshly created record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDataCommand;

#[async_trait]
impl UserDataCommand for FixtureUserDataCommand {
    async fn update_user_data(&self, request: UpdateUserDataRequest) -> Result<UserRecord, Error> {
        let stats = RentalStats::try_new(
            request.total_average_weight_ratings,
            request.number_of_rents,
        )?;
        Ok(UserRecord::created(request.user_id, stats, 0))
    }
}
