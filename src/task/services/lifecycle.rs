//! Service layer for task lifecycle, time tracking, sharing, and selection.

use crate::identity::{EmailAddress, Identity};
use crate::task::{
    domain::{
        Priority, RunClearance, Task, TaskAccess, TaskDomainError, TaskId, TaskSeed, TaskUpdate,
        today,
    },
    ports::{
        DirectoryError, ProjectDirectory, ProjectSummary, TaskRepository, TaskRepositoryError,
    },
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Task joined with its referenced project, when that project still
/// exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListing {
    /// The task record.
    pub task: Task,
    /// Summary of the linked project; `None` when the task is unlinked or
    /// the project has been deleted.
    pub project: Option<ProjectSummary>,
}

/// Outcome of bulk-sharing a task with its project's collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareOutcome {
    /// Whether there were collaborators to share with at all.
    pub success: bool,
    /// How many emails were newly added to the share set.
    pub added: usize,
    /// Size of the share set after the call.
    pub total: usize,
}

/// Candidate task extracted from an image by the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTaskCandidate {
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
    estimate_hours: Option<u32>,
    analysis: Option<Value>,
}

impl ExtractedTaskCandidate {
    /// Creates a candidate with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: None,
            estimate_hours: None,
            analysis: None,
        }
    }

    /// Sets the extracted description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the extracted priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the extracted whole-hour estimate.
    #[must_use]
    pub const fn with_estimate_hours(mut self, hours: u32) -> Self {
        self.estimate_hours = Some(hours);
        self
    }

    /// Attaches the raw analysis payload for traceability.
    #[must_use]
    pub fn with_analysis(mut self, analysis: Value) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// No identity context was supplied for a mutation.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The identity lacks the email address the operation requires.
    #[error("an email address is required for this operation")]
    EmailRequired,

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The identity has no relationship to the task that would permit the
    /// operation.
    #[error("not authorized")]
    NotAuthorized,

    /// The identity can see the task but has not selected it today;
    /// selecting it first unlocks timer operations.
    #[error("task not selected today")]
    NotSelectedToday,

    /// Bulk sharing requires the task to be linked to a project.
    #[error("task {0} is not linked to a project")]
    NoProject(TaskId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Registry directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, P, C>
where
    R: TaskRepository,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<P>,
    clock: Arc<C>,
}

impl<R, P, C> TaskLifecycleService<R, P, C>
where
    R: TaskRepository,
    P: ProjectDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            clock,
        }
    }

    /// Creates a task owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotAuthenticated`] without identity or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create_task(
        &self,
        identity: Option<&Identity>,
        seed: TaskSeed,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let task = Task::new(identity.subject().clone(), seed, &*self.clock);
        self.repository.insert(&task).await?;
        Ok(task)
    }

    /// Ingests accepted image-extraction candidates as tasks owned by the
    /// caller, preserving each candidate's analysis payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when a candidate title is
    /// empty, in addition to the usual identity and persistence failures.
    pub async fn import_extracted_tasks(
        &self,
        identity: Option<&Identity>,
        candidates: Vec<ExtractedTaskCandidate>,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut tasks = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let mut seed = TaskSeed::new(candidate.title)?;
            if let Some(description) = candidate.description {
                seed = seed.with_details(description);
            }
            if let Some(priority) = candidate.priority {
                seed = seed.with_priority(priority);
            }
            if let Some(hours) = candidate.estimate_hours {
                seed = seed.with_estimate_hours(hours);
            }
            if let Some(analysis) = candidate.analysis {
                seed = seed.with_analysis_data(analysis);
            }
            let task = Task::new(identity.subject().clone(), seed, &*self.clock);
            self.repository.insert(&task).await?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    /// Applies a partial update. The owner may always edit; share members
    /// may edit shared task fields too. Only the owner may delete.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotAuthorized`] when the caller has no
    /// access, in addition to the usual identity and lookup failures.
    pub async fn update_task(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        task.access(identity)
            .ok_or(TaskLifecycleError::NotAuthorized)?;
        task.apply_update(update, &*self.clock);
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Hard-deletes an owned task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotAuthorized`] for non-owners in
    /// addition to the usual identity and lookup failures.
    pub async fn delete_task(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<()> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let task = self.find_task_or_error(task_id).await?;
        self.require_owner(&task, identity)?;
        self.repository.delete(task_id).await?;
        Ok(())
    }

    /// Returns the caller's tasks: owned ones plus tasks shared with the
    /// caller's email, each tolerantly joined with its project. A missing
    /// or deleted project yields `None`, never an error. Unauthenticated
    /// callers get an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] or
    /// [`TaskLifecycleError::Directory`] when lookups fail.
    pub async fn list_tasks(
        &self,
        identity: Option<&Identity>,
    ) -> TaskLifecycleResult<Vec<TaskListing>> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };

        let mut tasks = self.repository.list_owned_by(identity.subject()).await?;
        if let Some(email) = identity.email() {
            let shared = self.repository.list_shared_with(email).await?;
            for task in shared {
                if tasks.iter().all(|existing| existing.id() != task.id()) {
                    tasks.push(task);
                }
            }
        }

        let mut listings = Vec::with_capacity(tasks.len());
        for task in tasks {
            let project = match task.project_id() {
                Some(project_id) => self.directory.project_summary(project_id).await?,
                None => None,
            };
            listings.push(TaskListing { task, project });
        }
        Ok(listings)
    }

    /// Starts the task's timer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] wrapping
    /// [`TaskDomainError::AlreadyRunning`] on a double start,
    /// [`TaskLifecycleError::NotSelectedToday`] for share members without a
    /// same-day selection, and [`TaskLifecycleError::NotAuthorized`] for
    /// strangers.
    pub async fn start(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        self.require_run_clearance(&task, identity)?;
        task.start(&*self.clock)?;
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Stops the task's timer, accumulating the run's duration.
    ///
    /// # Errors
    ///
    /// Returns the same run authorization failures as
    /// [`TaskLifecycleService::start`].
    pub async fn stop(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        self.require_run_clearance(&task, identity)?;
        task.stop(&*self.clock);
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Completes the task, accumulating the current run if one is open.
    ///
    /// # Errors
    ///
    /// Returns the same run authorization failures as
    /// [`TaskLifecycleService::start`].
    pub async fn complete(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        self.require_run_clearance(&task, identity)?;
        task.complete(&*self.clock);
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Explicitly zeroes an owned task's tracked time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotAuthorized`] for non-owners in
    /// addition to the usual identity and lookup failures.
    pub async fn reset_timer(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        self.require_owner(&task, identity)?;
        task.reset_tracked_time(&*self.clock);
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Selects or deselects the task for the caller today.
    ///
    /// Selection is the entry point to running a shared task, so it is
    /// authorized by share membership rather than prior selection. A
    /// repeat selection on the same UTC day keeps the original instant.
    /// The task is persisted even on a no-op so legacy selection fields
    /// are cleared as migration cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::EmailRequired`] when the caller has
    /// no email and [`TaskLifecycleError::NotAuthorized`] when the caller
    /// is neither owner nor share member.
    pub async fn toggle_selection(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
        selected: bool,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let email = identity
            .email()
            .cloned()
            .ok_or(TaskLifecycleError::EmailRequired)?;
        let mut task = self.find_task_or_error(task_id).await?;
        task.access(identity)
            .ok_or(TaskLifecycleError::NotAuthorized)?;

        if selected {
            task.select(email, &*self.clock);
        } else {
            task.deselect(&email, &*self.clock);
        }
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Shares an owned task with every collaborator of its linked project.
    ///
    /// Sharing is additive: existing shared emails are never removed, and
    /// the owner's own email is excluded. The outcome distinguishes "no
    /// collaborators exist yet" (`success = false`) from "already fully
    /// shared" (`added = 0`) from "added N new".
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NoProject`] when the task has no
    /// linked project, in addition to the usual identity, lookup, and
    /// authorization failures.
    pub async fn share_with_collaborators(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<ShareOutcome> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        self.require_owner(&task, identity)?;
        let project_id = task
            .project_id()
            .ok_or(TaskLifecycleError::NoProject(task_id))?;

        let emails: Vec<EmailAddress> = self
            .directory
            .collaborator_emails(project_id)
            .await?
            .into_iter()
            .filter(|email| identity.email() != Some(email))
            .collect();
        if emails.is_empty() {
            return Ok(ShareOutcome {
                success: false,
                added: 0,
                total: task.shares().len(),
            });
        }

        let added = task.share_with(emails, &*self.clock);
        if added > 0 {
            self.repository.update(&task).await?;
        }
        Ok(ShareOutcome {
            success: true,
            added,
            total: task.shares().len(),
        })
    }

    /// Clears an owned task's whole share set, making it private again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotAuthorized`] for non-owners in
    /// addition to the usual identity and lookup failures.
    pub async fn unshare(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let identity = identity.ok_or(TaskLifecycleError::NotAuthenticated)?;
        let mut task = self.find_task_or_error(task_id).await?;
        self.require_owner(&task, identity)?;
        task.unshare_all(&*self.clock);
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Requires clearance to run the task's timer today.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotSelectedToday`] for share members
    /// without a same-day selection (recoverable: select, then retry) and
    /// [`TaskLifecycleError::NotAuthorized`] for callers with no
    /// relationship to the task.
    fn require_run_clearance(
        &self,
        task: &Task,
        identity: &Identity,
    ) -> TaskLifecycleResult<()> {
        match task.run_clearance(identity, today(&*self.clock)) {
            RunClearance::Owner | RunClearance::SelectedToday => Ok(()),
            RunClearance::SharedNotSelected => Err(TaskLifecycleError::NotSelectedToday),
            RunClearance::Stranger => Err(TaskLifecycleError::NotAuthorized),
        }
    }

    fn require_owner(&self, task: &Task, identity: &Identity) -> TaskLifecycleResult<()> {
        match task.access(identity) {
            Some(TaskAccess::Owner) => Ok(()),
            _ => Err(TaskLifecycleError::NotAuthorized),
        }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }
}
