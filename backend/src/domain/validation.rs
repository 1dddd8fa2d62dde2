//! Validation rules for the mutable user record fields.
//!
//! Both rules are plain predicates. Callers decide how to react to a `false`
//! result; see [`crate::domain::RentalStats::try_new`] for the typed wrapper.

/// Upper bound of the average weight rating scale.
pub const MAX_RATING: f64 = 5.0;

/// Largest rent count that survives a round trip through a JSON number.
///
/// Clients send the count as a JSON number, so anything above 2^53 - 1 can
/// no longer be represented exactly.
pub const MAX_RENT_COUNT: f64 = 9_007_199_254_740_991.0;

/// Return `true` when `rating` is finite and within `0..=5`.
///
/// # Examples
/// ```
/// use ebuddy_backend::domain::is_valid_rating;
///
/// assert!(is_valid_rating(4.8));
/// assert!(!is_valid_rating(5.1));
/// assert!(!is_valid_rating(f64::NAN));
/// ```
#[must_use]
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (0.0..=MAX_RATING).contains(&rating)
}

/// Return `true` when `count` is a non-negative integer.
///
/// # Examples
/// ```
/// use ebuddy_backend::domain::is_valid_rent_count;
///
/// assert!(is_valid_rent_count(10.0));
/// assert!(!is_valid_rent_count(-1.0));
/// assert!(!is_valid_rent_count(2.5));
/// ```
#[must_use]
pub fn is_valid_rent_count(count: f64) -> bool {
    count.is_finite() && count.fract() == 0.0 && (0.0..=MAX_RENT_COUNT).contains(&count)
}
