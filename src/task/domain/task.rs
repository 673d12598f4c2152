//! Task aggregate root: lifecycle, timer, sharing, and selection.

use super::{
    Priority, RunClearance, SelectionLedger, ShareSet, TaskAccess, TaskDomainError, TaskId,
    TaskStatus, TrackedTime, selection_day,
};
use crate::identity::{EmailAddress, Identity, SubjectId};
use crate::patch::FieldPatch;
use crate::project::domain::ProjectId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptive fields captured at task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSeed {
    text: String,
    details: String,
    priority: Priority,
    estimate_hours: u32,
    ref_link: Option<String>,
    project_id: Option<ProjectId>,
    analysis_data: Option<Value>,
}

impl TaskSeed {
    /// Creates a seed with defaults: medium priority, a one-hour estimate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyText`] when the text is empty after
    /// trimming.
    pub fn new(text: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = text.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyText);
        }
        Ok(Self {
            text: trimmed.to_owned(),
            details: String::new(),
            priority: Priority::Medium,
            estimate_hours: 1,
            ref_link: None,
            project_id: None,
            analysis_data: None,
        })
    }

    /// Sets the task details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the whole-hour effort estimate.
    #[must_use]
    pub const fn with_estimate_hours(mut self, hours: u32) -> Self {
        self.estimate_hours = hours;
        self
    }

    /// Sets the reference link.
    #[must_use]
    pub fn with_ref_link(mut self, link: impl Into<String>) -> Self {
        self.ref_link = Some(link.into());
        self
    }

    /// Links the task to a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Attaches the opaque analysis payload the task was extracted from.
    #[must_use]
    pub fn with_analysis_data(mut self, data: Value) -> Self {
        self.analysis_data = Some(data);
        self
    }
}

/// Partial update for task fields.
///
/// Unset fields leave the stored value untouched. Clearable fields use
/// [`FieldPatch`] so clearing and keeping stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskUpdate {
    text: Option<String>,
    details: Option<String>,
    priority: Option<Priority>,
    status: Option<TaskStatus>,
    estimate_hours: Option<u32>,
    ref_link: FieldPatch<String>,
    project_id: FieldPatch<ProjectId>,
    analysis_data: FieldPatch<Value>,
}

impl TaskUpdate {
    /// Creates an empty update touching nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the task text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Replaces the details.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Moves the task to a status through the regular transition rules.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the whole-hour effort estimate.
    #[must_use]
    pub const fn estimate_hours(mut self, hours: u32) -> Self {
        self.estimate_hours = Some(hours);
        self
    }

    /// Sets or clears the reference link.
    #[must_use]
    pub fn ref_link(mut self, patch: FieldPatch<String>) -> Self {
        self.ref_link = patch;
        self
    }

    /// Sets or clears the project link.
    #[must_use]
    pub fn project(mut self, patch: FieldPatch<ProjectId>) -> Self {
        self.project_id = patch;
        self
    }

    /// Sets or clears the analysis payload.
    #[must_use]
    pub fn analysis_data(mut self, patch: FieldPatch<Value>) -> Self {
        self.analysis_data = patch;
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    owner: SubjectId,
    text: String,
    details: String,
    priority: Priority,
    status: TaskStatus,
    estimate_hours: u32,
    ref_link: Option<String>,
    project_id: Option<ProjectId>,
    tracked_time: TrackedTime,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    shares: ShareSet,
    selections: SelectionLedger,
    analysis_data: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner subject.
    pub owner: SubjectId,
    /// Persisted text.
    pub text: String,
    /// Persisted details.
    pub details: String,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted whole-hour effort estimate.
    pub estimate_hours: u32,
    /// Persisted reference link, if any.
    pub ref_link: Option<String>,
    /// Persisted project reference, if any.
    pub project_id: Option<ProjectId>,
    /// Persisted tracked time.
    pub tracked_time: TrackedTime,
    /// Persisted running-timer start, if any.
    pub started_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted share set.
    pub shares: ShareSet,
    /// Persisted selection ledger.
    pub selections: SelectionLedger,
    /// Persisted analysis payload, if any.
    pub analysis_data: Option<Value>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new private task owned by the given subject.
    #[must_use]
    pub fn new(owner: SubjectId, seed: TaskSeed, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            owner,
            text: seed.text,
            details: seed.details,
            priority: seed.priority,
            status: TaskStatus::Todo,
            estimate_hours: seed.estimate_hours,
            ref_link: seed.ref_link,
            project_id: seed.project_id,
            tracked_time: TrackedTime::ZERO,
            started_at: None,
            completed_at: None,
            shares: ShareSet::new(),
            selections: SelectionLedger::new(),
            analysis_data: seed.analysis_data,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            text: data.text,
            details: data.details,
            priority: data.priority,
            status: data.status,
            estimate_hours: data.estimate_hours,
            ref_link: data.ref_link,
            project_id: data.project_id,
            tracked_time: data.tracked_time,
            started_at: data.started_at,
            completed_at: data.completed_at,
            shares: data.shares,
            selections: data.selections,
            analysis_data: data.analysis_data,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owner subject.
    #[must_use]
    pub const fn owner(&self) -> &SubjectId {
        &self.owner
    }

    /// Returns the task text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the details.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the whole-hour effort estimate.
    #[must_use]
    pub const fn estimate_hours(&self) -> u32 {
        self.estimate_hours
    }

    /// Returns the reference link, if any.
    #[must_use]
    pub fn ref_link(&self) -> Option<&str> {
        self.ref_link.as_deref()
    }

    /// Returns the linked project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the accumulated tracked time.
    #[must_use]
    pub const fn tracked_time(&self) -> TrackedTime {
        self.tracked_time
    }

    /// Returns the running-timer start, if a run is in progress.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the share set.
    #[must_use]
    pub const fn shares(&self) -> &ShareSet {
        &self.shares
    }

    /// Returns the selection ledger.
    #[must_use]
    pub const fn selections(&self) -> &SelectionLedger {
        &self.selections
    }

    /// Returns the analysis payload, if any.
    #[must_use]
    pub const fn analysis_data(&self) -> Option<&Value> {
        self.analysis_data.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether a timer run is in progress.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Resolves the caller's standing access to this task: ownership, or
    /// visibility through the share set.
    #[must_use]
    pub fn access(&self, identity: &Identity) -> Option<TaskAccess> {
        if &self.owner == identity.subject() {
            return Some(TaskAccess::Owner);
        }
        identity
            .email()
            .filter(|email| self.shares.contains(email))
            .map(|_| TaskAccess::Shared)
    }

    /// Resolves the caller's clearance to run this task's timer on the
    /// given day.
    ///
    /// A selection authorizes runs on its own calendar day even if the
    /// share set has since been cleared; it lapses at the next midnight.
    #[must_use]
    pub fn run_clearance(&self, identity: &Identity, today: NaiveDate) -> RunClearance {
        if &self.owner == identity.subject() {
            return RunClearance::Owner;
        }
        let Some(email) = identity.email() else {
            return RunClearance::Stranger;
        };
        if self.selections.selected_on(email, today) {
            return RunClearance::SelectedToday;
        }
        if self.shares.contains(email) {
            return RunClearance::SharedNotSelected;
        }
        RunClearance::Stranger
    }

    /// Starts a timer run.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyRunning`] when a run is already in
    /// progress; the guard keeps a double-click from double-counting time.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.status == TaskStatus::InProgress && self.started_at.is_some() {
            return Err(TaskDomainError::AlreadyRunning(self.id));
        }
        self.started_at = Some(clock.utc());
        self.status = TaskStatus::InProgress;
        self.touch(clock);
        Ok(())
    }

    /// Stops the current run, accumulating its duration, and returns the
    /// task to todo.
    pub fn stop(&mut self, clock: &impl Clock) {
        self.accumulate_run(clock.utc());
        self.started_at = None;
        self.status = TaskStatus::Todo;
        self.touch(clock);
    }

    /// Completes the task, accumulating the current run if one is in
    /// progress.
    pub fn complete(&mut self, clock: &impl Clock) {
        let now = clock.utc();
        self.accumulate_run(now);
        self.started_at = None;
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
        self.touch(clock);
    }

    /// Reopens a done task back to todo. The timer is not restored and
    /// tracked time is untouched.
    pub fn reopen(&mut self, clock: &impl Clock) {
        self.status = TaskStatus::Todo;
        self.started_at = None;
        self.completed_at = None;
        self.touch(clock);
    }

    /// Explicitly zeroes the accumulated tracked time.
    pub fn reset_tracked_time(&mut self, clock: &impl Clock) {
        self.tracked_time = TrackedTime::ZERO;
        self.touch(clock);
    }

    /// Records a selection for the email at the current instant.
    ///
    /// Selecting again on the same UTC day keeps the original instant and
    /// returns `false`.
    pub fn select(&mut self, email: EmailAddress, clock: &impl Clock) -> bool {
        let changed = self.selections.select(email, clock.utc());
        if changed {
            self.touch(clock);
        }
        changed
    }

    /// Removes the email's selection. Returns `true` when one existed.
    pub fn deselect(&mut self, email: &EmailAddress, clock: &impl Clock) -> bool {
        let changed = self.selections.deselect(email);
        if changed {
            self.touch(clock);
        }
        changed
    }

    /// Unions emails into the share set and returns how many were new.
    pub fn share_with(
        &mut self,
        emails: impl IntoIterator<Item = EmailAddress>,
        clock: &impl Clock,
    ) -> usize {
        let added = self.shares.extend(emails);
        if added > 0 {
            self.touch(clock);
        }
        added
    }

    /// Clears the whole share set, making the task private again.
    pub fn unshare_all(&mut self, clock: &impl Clock) {
        self.shares.clear();
        self.touch(clock);
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// A status change routes through the regular transition rules so the
    /// running-timer invariant holds: leaving in-progress accumulates the
    /// open run, entering done stamps completion, reopening clears it.
    pub fn apply_update(&mut self, update: TaskUpdate, clock: &impl Clock) {
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(details) = update.details {
            self.details = details;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(hours) = update.estimate_hours {
            self.estimate_hours = hours;
        }
        update.ref_link.apply(&mut self.ref_link);
        update.project_id.apply(&mut self.project_id);
        update.analysis_data.apply(&mut self.analysis_data);
        if let Some(status) = update.status {
            self.transition_status(status, clock);
        }
        self.touch(clock);
    }

    fn transition_status(&mut self, target: TaskStatus, clock: &impl Clock) {
        if self.status == target {
            return;
        }
        match target {
            TaskStatus::InProgress => {
                if self.started_at.is_none() {
                    self.started_at = Some(clock.utc());
                }
                self.status = TaskStatus::InProgress;
            }
            TaskStatus::Done => self.complete(clock),
            TaskStatus::Todo => {
                if self.status == TaskStatus::Done {
                    self.reopen(clock);
                } else {
                    self.stop(clock);
                }
            }
        }
    }

    fn accumulate_run(&mut self, now: DateTime<Utc>) {
        if let Some(started_at) = self.started_at {
            self.tracked_time = self.tracked_time.accumulate(now - started_at);
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Returns the UTC day the clock currently falls on; the canonical
/// "today" shared by every selection read and write path.
#[must_use]
pub fn today(clock: &impl Clock) -> NaiveDate {
    selection_day(clock.utc())
}
