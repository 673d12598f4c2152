//! Accumulated tracked time for task timer runs.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total elapsed working time accumulated over completed timer runs, in
/// milliseconds.
///
/// Monotonic non-decreasing under accumulation: an individual run can
/// never contribute negative time, even under clock skew. Only an explicit
/// reset moves the value down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrackedTime(i64);

impl TrackedTime {
    /// Zero tracked time.
    pub const ZERO: Self = Self(0);

    /// Reconstructs a value from persisted milliseconds, clamping negative
    /// payloads to zero.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        if millis < 0 { Self(0) } else { Self(millis) }
    }

    /// Returns the total in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Adds a completed run, clamping its contribution to non-negative so
    /// backwards clock movement never shrinks the total.
    #[must_use]
    pub fn accumulate(self, run: TimeDelta) -> Self {
        Self(self.0.saturating_add(run.num_milliseconds().max(0)))
    }
}

impl fmt::Display for TrackedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
