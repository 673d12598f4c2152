//! Access resolution for task operations.
//!
//! Every handler resolves the caller's relationship to a task through
//! these types so the owner/shared/selected authorization matrix stays
//! consistent and testable in one place.

/// Caller's standing relationship to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAccess {
    /// The caller owns the task.
    Owner,
    /// The caller's email is in the task's share set.
    Shared,
}

/// Caller's clearance to run a task's timer (start, stop, complete).
///
/// Running requires more than visibility: a non-owner must have selected
/// the task on the current calendar day. The distinction between
/// [`RunClearance::SharedNotSelected`] and [`RunClearance::Stranger`]
/// drives the recoverable-versus-fatal error split — a share member can
/// fix their clearance by selecting, a stranger cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClearance {
    /// The caller owns the task and may always run it.
    Owner,
    /// The caller selected the task today and may run it.
    SelectedToday,
    /// The caller can see the task but has no same-day selection.
    SharedNotSelected,
    /// The caller has no relationship to the task.
    Stranger,
}

impl RunClearance {
    /// Returns whether this clearance permits timer operations.
    #[must_use]
    pub const fn permits_run(self) -> bool {
        matches!(self, Self::Owner | Self::SelectedToday)
    }
}
