//! Driving port for reading a user's record.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserRecord};

/// Domain use-case port for the fetch flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDataQuery: Send + Sync {
    /// Record activity for the caller, then return their record.
    ///
    /// The activity touch is best effort; only the read decides the outcome.
    /// A caller without a record gets
    /// [`ErrorCode::NotFound`](crate::domain::ErrorCode::NotFound).
    async fn fetch_user_data(&self, user_id: &UserId) -> Result<UserRecord, Error>;
}

/// Fixture query for which no user exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDataQuery;

#[async_trait]
impl UserDataQuery for FixtureUserDataQuery {
    async fn fetch_user_data(&self, _user_id: &UserId) -> Result<UserRecord, Error> {
        Err(Error::not_found("User not found"))
    }
}
