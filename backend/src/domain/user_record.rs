//! The per-user record and its identifier.
//!
//! A [`UserRecord`] is keyed by the caller's authenticated identity. Only the
//! two [`RentalStats`] fields are caller controlled; the timestamps are owned
//! by the record store adapters.

use std::fmt;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Error;
use super::validation::{is_valid_rating, is_valid_rent_count};

/// Milliseconds since the Unix epoch, as stored in the record document.
pub type EpochMillis = i64;

/// Current time from `clock` in epoch milliseconds.
pub fn epoch_millis(clock: &dyn Clock) -> EpochMillis {
    clock.utc().timestamp_millis()
}

/// Longest identity accepted as a document key.
const USER_ID_MAX_LEN: usize = 128;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdValidationError {
    #[error("user id must not be empty")]
    Empty,
    #[error("user id must not have leading or trailing whitespace")]
    SurroundingWhitespace,
    #[error("user id must not contain '/'")]
    ContainsSlash,
    #[error("user id must be at most {max} characters")]
    TooLong { max: usize },
}

/// Opaque identity of a user, as resolved from an authentication token.
///
/// The value doubles as the document key in the record store, so it must be
/// non-empty and must not contain path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use ebuddy_backend::domain::UserId;
    ///
    /// let id = UserId::new("u1").expect("valid id");
    /// assert_eq!(id.as_ref(), "u1");
    /// assert!(UserId::new("").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if id.trim() != id {
            return Err(UserIdValidationError::SurroundingWhitespace);
        }
        if id.contains('/') {
            return Err(UserIdValidationError::ContainsSlash);
        }
        if id.chars().count() > USER_ID_MAX_LEN {
            return Err(UserIdValidationError::TooLong {
                max: USER_ID_MAX_LEN,
            });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validation errors returned by [`RentalStats::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RentalStatsValidationError {
    #[error("totalAverageWeightRatings must be between 0 and 5, got {value}")]
    InvalidRating { value: f64 },
    #[error("numberOfRents must be a non-negative integer, got {value}")]
    InvalidRentCount { value: f64 },
}

impl RentalStatsValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidRating { .. } => "totalAverageWeightRatings",
            Self::InvalidRentCount { .. } => "numberOfRents",
        }
    }

    /// Machine-readable reason: `not_an_integer` for a finite fractional rent
    /// count, `out_of_range` otherwise.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRentCount { value } if value.is_finite() && value.fract() != 0.0 => {
                "not_an_integer"
            }
            _ => "out_of_range",
        }
    }
}

impl From<RentalStatsValidationError> for Error {
    fn from(err: RentalStatsValidationError) -> Self {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": err.reason(),
        }))
    }
}

/// The two caller-controlled fields of a user record.
///
/// ## Invariants
/// - `total_average_weight_ratings` is finite and within `0..=5`.
/// - `number_of_rents` is a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentalStats {
    total_average_weight_ratings: f64,
    number_of_rents: u64,
}

impl RentalStats {
    /// Validate raw numeric input.
    ///
    /// The rating is checked first, so a request with two bad fields reports
    /// the rating.
    ///
    /// # Examples
    /// ```
    /// use ebuddy_backend::domain::{RentalStats, RentalStatsValidationError};
    ///
    /// let stats = RentalStats::try_new(4.8, 10.0).expect("valid stats");
    /// assert_eq!(stats.number_of_rents(), 10);
    ///
    /// let err = RentalStats::try_new(5.1, 10.0).expect_err("rating too high");
    /// assert!(matches!(err, RentalStatsValidationError::InvalidRating { .. }));
    /// ```
    pub fn try_new(
        total_average_weight_ratings: f64,
        number_of_rents: f64,
    ) -> Result<Self, RentalStatsValidationError> {
        if !is_valid_rating(total_average_weight_ratings) {
            return Err(RentalStatsValidationError::InvalidRating {
                value: total_average_weight_ratings,
            });
        }
        if !is_valid_rent_count(number_of_rents) {
            return Err(RentalStatsValidationError::InvalidRentCount {
                value: number_of_rents,
            });
        }
        // Integral, non-negative, and below 2^53 per the check above.
        Ok(Self {
            total_average_weight_ratings,
            number_of_rents: number_of_rents as u64,
        })
    }

    pub fn total_average_weight_ratings(&self) -> f64 {
        self.total_average_weight_ratings
    }

    pub fn number_of_rents(&self) -> u64 {
        self.number_of_rents
    }
}

/// The single per-user document.
///
/// Serialises with the camelCase field names clients already consume.
///
/// ## Invariants
/// - `created_at <= updated_at`.
/// - `created_at` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub total_average_weight_ratings: f64,
    pub number_of_rents: u64,
    pub recently_active: EpochMillis,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

impl UserRecord {
    /// Build a freshly created record with every timestamp set to `now`.
    ///
    /// # Examples
    /// ```
    /// use ebuddy_backend::domain::{RentalStats, UserId, UserRecord};
    ///
    /// let stats = RentalStats::try_new(4.8, 10.0).expect("stats");
    /// let record = UserRecord::created(UserId::new("u1").expect("id"), stats, 1_000);
    /// assert_eq!(record.created_at, record.updated_at);
    /// assert_eq!(record.updated_at, record.recently_active);
    /// ```
    #[must_use]
    pub fn created(id: UserId, stats: RentalStats, now: EpochMillis) -> Self {
        Self {
            id,
            total_average_weight_ratings: stats.total_average_weight_ratings(),
            number_of_rents: stats.number_of_rents(),
            recently_active: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the rental fields and advance the write timestamps.
    pub fn merge_stats(&mut self, stats: RentalStats, now: EpochMillis) {
        self.total_average_weight_ratings = stats.total_average_weight_ratings();
        self.number_of_rents = stats.number_of_rents();
        self.touch(now);
    }

    /// Advance `recently_active` and `updated_at` without touching any field.
    pub fn touch(&mut self, now: EpochMillis) {
        self.recently_active = now;
        self.updated_at = now;
    }

    /// The caller-controlled fields of this record.
    #[must_use]
    pub fn stats(&self) -> RentalStats {
        RentalStats {
            total_average_weight_ratings: self.total_average_weight_ratings,
            number_of_rents: self.number_of_rents,
        }
    }
}
