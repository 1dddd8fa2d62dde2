//! Firestore outbound adapter.
//!
//! Implements the `UserRecordRepository` port over the Firestore REST v1 API,
//! one document per user in the `USERS` collection.

mod dto;
mod http_store;

pub use http_store::{
    DEFAULT_FIRESTORE_BASE_URL, FirestoreConfig, FirestoreSetupError,
    FirestoreUserRecordRepository, USERS_COLLECTION,
};
