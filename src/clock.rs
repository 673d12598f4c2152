//! Deterministic clock for tests and tooling.
//!
//! Production code receives time through [`mockable::Clock`]; services and
//! aggregates never read the ambient wall clock directly. [`FixedClock`]
//! pins the instant so calendar-day windowing and run durations can be
//! asserted exactly.

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Clock frozen at an explicit instant, advanced manually.
///
/// Interior mutability lets tests advance time through a shared
/// `Arc<FixedClock>` already handed to a service.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(instant.timestamp_millis()),
        }
    }

    /// Moves the clock to the given instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis
            .store(instant.timestamp_millis(), Ordering::SeqCst);
    }

    /// Advances the clock by the given delta. Negative deltas move it back,
    /// which tests use to simulate clock skew.
    pub fn advance(&self, delta: TimeDelta) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    fn instant(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.instant().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.instant()
    }
}
