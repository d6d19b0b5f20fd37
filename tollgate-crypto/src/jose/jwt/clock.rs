use std::fmt;

use jiff::Timestamp;

/// Source of the current time used for claim validation.
pub trait Clock: fmt::Debug + Send + Sync + 'static {
    /// The current instant
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
/// [`Clock`] reading the system wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// [`Clock`] which always returns the same instant
pub struct FixedClock(Timestamp);

impl FixedClock {
    /// Create a [`FixedClock`] stuck at `now`
    pub fn new(now: Timestamp) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
