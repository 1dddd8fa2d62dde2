//! Controllable clocks for exercising timestamp behaviour.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock whose current time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Start at the given epoch-millisecond instant.
    ///
    /// # Panics
    ///
    /// Panics when `millis` is outside chrono's representable range.
    pub fn at_millis(millis: i64) -> Self {
        match Utc.timestamp_millis_opt(millis).single() {
            Some(now) => Self::new(now),
            None => panic!("timestamp {millis} out of range"),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        *self.lock_clock() += TimeDelta::milliseconds(millis);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
