//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`UserDataCommand`], [`UserDataQuery`]) are what inbound
//! adapters call. Driven ports ([`UserRecordRepository`],
//! [`IdentityVerifier`]) are what the domain expects outbound adapters to
//! provide. Each driven port exposes a typed error built with
//! `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_verifier;
mod user_data_command;
mod user_data_query;
mod user_record_repository;

#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
pub use identity_verifier::{
    BearerToken, FixtureIdentityVerifier, IdentityVerifier, IdentityVerifierError,
    VerifiedIdentity,
};
#[cfg(test)]
pub use user_data_command::MockUserDataCommand;
pub use user_data_command::{FixtureUserDataCommand, UpdateUserDataRequest, UserDataCommand};
#[cfg(test)]
pub use user_data_query::MockUserDataQuery;
pub use user_data_query::{FixtureUserDataQuery, UserDataQuery};
#[cfg(test)]
pub use user_record_repository::MockUserRecordRepository;
pub use user_record_repository::{UserRecordRepository, UserRecordRepositoryError};
