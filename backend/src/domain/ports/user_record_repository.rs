//! Port for user record persistence.
//!
//! The [`UserRecordRepository`] trait is the only way the domain reaches the
//! document store. Adapters own the record timestamps: every write stamps
//! `updatedAt` and `recentlyActive` from the adapter's clock, and `createdAt`
//! is written exactly once by [`UserRecordRepository::create`].

use async_trait::async_trait;

use crate::domain::{RentalStats, UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user record repository adapters.
    pub enum UserRecordRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "user record store connection failed: {message}",
        /// The store answered but the read or write failed.
        Query { message: String } =>
            "user record store query failed: {message}",
        /// A conditional create found an existing document.
        AlreadyExists { user_id: String } =>
            "user record {user_id} already exists",
        /// An activity touch targeted a document that does not exist.
        Missing { user_id: String } =>
            "user record {user_id} does not exist",
        /// A merge succeeded but the follow-up read found nothing.
        Vanished { user_id: String } =>
            "user record {user_id} vanished after a successful write",
    }
}

/// Port for reading and writing the single per-user document.
///
/// # Write semantics
///
/// - [`create`](Self::create) is create-if-absent. When a document already
///   exists it fails with [`UserRecordRepositoryError::AlreadyExists`] and
///   leaves the stored document unchanged.
/// - [`merge`](Self::merge) overwrites only the two rental fields plus the
///   write timestamps, then re-reads the document.
/// - [`touch_activity`](Self::touch_activity) advances `recentlyActive` and
///   `updatedAt` on an existing document only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRecordRepository: Send + Sync {
    /// Fetch the record for `user_id`, or `None` when it was never created.
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRecord>, UserRecordRepositoryError>;

    /// Create a record with every timestamp set to now.
    async fn create(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError>;

    /// Merge the rental fields into an existing record and return the
    /// re-read document.
    ///
    /// Fails with [`UserRecordRepositoryError::Vanished`] when the re-read
    /// finds nothing.
    async fn merge(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError>;

    /// Mark the user as recently active.
    ///
    /// Fails with [`UserRecordRepositoryError::Missing`] when no document
    /// exists; this call never creates one.
    async fn touch_activity(&self, user_id: &UserId) -> Result<(), UserRecordRepositoryError>;
}
