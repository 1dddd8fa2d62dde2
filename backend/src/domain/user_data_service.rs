//! User data domain service.
//!
//! Implements [`UserDataCommand`] and [`UserDataQuery`] over a
//! [`UserRecordRepository`]. Validation runs before any store call; store
//! failures surface as internal errors and are logged here, once.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    UpdateUserDataRequest, UserDataCommand, UserDataQuery, UserRecordRepository,
    UserRecordRepositoryError,
};
use crate::domain::{Error, RentalStats, UserId, UserRecord};

/// User data service implementing the driving ports.
#[derive(Clone)]
pub struct UserDataService<R> {
    repo: Arc<R>,
}

impl<R> UserDataService<R> {
    /// Create a new service backed by `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> UserDataService<R>
where
    R: UserRecordRepository,
{
    fn map_repository_error(
        user_id: &UserId,
        operation: &'static str,
        err: UserRecordRepositoryError,
    ) -> Error {
        match &err {
            UserRecordRepositoryError::Vanished { .. } => {
                error!(
                    user_id = %user_id,
                    operation,
                    error = %err,
                    "user record missing immediately after a successful write"
                );
            }
            _ => {
                error!(user_id = %user_id, operation, error = %err, "user record store failed");
            }
        }
        Error::internal(format!("Internal server error while {operation} user data"))
    }

    async fn write_stats(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError> {
        if self.repo.get(user_id).await?.is_some() {
            return self.repo.merge(user_id, stats).await;
        }

        match self.repo.create(user_id, stats).await {
            Err(UserRecordRepositoryError::AlreadyExists { .. }) => {
                info!(user_id = %user_id, "user record created concurrently; merging instead");
                self.repo.merge(user_id, stats).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl<R> UserDataCommand for UserDataService<R>
where
    R: UserRecordRepository,
{
    async fn update_user_data(&self, request: UpdateUserDataRequest) -> Result<UserRecord, Error> {
        let UpdateUserDataRequest {
            user_id,
            total_average_weight_ratings,
            number_of_rents,
        } = request;

        let stats = RentalStats::try_new(total_average_weight_ratings, number_of_rents)?;

        self.write_stats(&user_id, &stats)
            .await
            .map_err(|err| Self::map_repository_error(&user_id, "updating", err))
    }
}

#[async_trait]
impl<R> UserDataQuery for UserDataService<R>
where
    R: UserRecordRepository,
{
    async fn fetch_user_data(&self, user_id: &UserId) -> Result<UserRecord, Error> {
        // Best effort: a missing record or store hiccup must not fail the read.
        if let Err(err) = self.repo.touch_activity(user_id).await {
            warn!(user_id = %user_id, error = %err, "failed to update user activity");
        }

        self.repo
            .get(user_id)
            .await
            .map_err(|err| Self::map_repository_error(user_id, "fetching", err))?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[cfg(test)]
#[path = "user_data_service_tests.rs"]
mod tests;
