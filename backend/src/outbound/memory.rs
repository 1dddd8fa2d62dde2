//! In-process user record store.
//!
//! Backs local runs and tests. Records live in a `HashMap` behind a tokio
//! `RwLock`; each write holds the write lock for its whole read-modify-write,
//! clock read included, so create-if-absent is atomic and `updatedAt` never
//! runs backwards between concurrent writers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::ports::{UserRecordRepository, UserRecordRepositoryError};
use crate::domain::{RentalStats, UserId, UserRecord, epoch_millis};

/// [`UserRecordRepository`] holding records in memory.
pub struct InMemoryUserRecordRepository {
    records: RwLock<HashMap<UserId, UserRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRecordRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserRecordRepository for InMemoryUserRecordRepository {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRecord>, UserRecordRepositoryError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn create(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(user_id) {
            return Err(UserRecordRepositoryError::already_exists(user_id.as_ref()));
        }
        let record = UserRecord::created(user_id.clone(), *stats, epoch_millis(self.clock.as_ref()));
        records.insert(user_id.clone(), record.clone());
        Ok(record)
    }

    async fn merge(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(user_id)
            .ok_or_else(|| UserRecordRepositoryError::vanished(user_id.as_ref()))?;
        let now = epoch_millis(self.clock.as_ref());
        record.merge_stats(*stats, now);
        Ok(record.clone())
    }

    async fn touch_activity(&self, user_id: &UserId) -> Result<(), UserRecordRepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(user_id)
            .ok_or_else(|| UserRecordRepositoryError::missing(user_id.as_ref()))?;
        let now = epoch_millis(self.clock.as_ref());
        record.touch(now);
        Ok(())
    }
}
