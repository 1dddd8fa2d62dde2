//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: in-process user record store for local runs and tests.
//! - **firestore**: user record store over the Firestore REST API.
//! - **identity**: Firebase ID token verification and a development-only
//!   token scheme.
//!
//! Adapters translate between domain types and wire representations. They
//! contain no business logic.

pub mod firestore;
pub mod identity;
pub mod memory;

pub use memory::InMemoryUserRecordRepository;
