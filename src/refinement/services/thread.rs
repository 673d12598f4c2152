//! Service layer for task refinement threads.

use crate::identity::Identity;
use crate::refinement::{
    domain::{
        Author, AuthorRole, Refinement, RefinementDomainError, RefinementId, RefinementKind,
    },
    ports::{
        RefinementRepository, RefinementRepositoryError, TaskAccessView, TaskDirectory,
        TaskDirectoryError,
    },
};
use crate::task::domain::TaskId;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for refinement thread operations.
#[derive(Debug, Error)]
pub enum RefinementThreadError {
    /// No identity context was supplied for a mutation.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The identity lacks the email address used for author attribution.
    #[error("an email address is required for this operation")]
    EmailRequired,

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced question does not exist.
    #[error("question not found: {0}")]
    QuestionNotFound(RefinementId),

    /// The identity has no relationship to the task that would permit the
    /// operation.
    #[error("not authorized")]
    NotAuthorized,

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RefinementDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RefinementRepositoryError),

    /// Task directory lookup failed.
    #[error(transparent)]
    Directory(#[from] TaskDirectoryError),
}

/// Result type for refinement thread service operations.
pub type RefinementThreadResult<T> = Result<T, RefinementThreadError>;

/// Refinement thread orchestration service.
#[derive(Clone)]
pub struct RefinementThreadService<R, T, C>
where
    R: RefinementRepository,
    T: TaskDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    tasks: Arc<T>,
    clock: Arc<C>,
}

impl<R, T, C> RefinementThreadService<R, T, C>
where
    R: RefinementRepository,
    T: TaskDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new refinement thread service.
    #[must_use]
    pub const fn new(repository: Arc<R>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            repository,
            tasks,
            clock,
        }
    }

    /// Posts a note, question, or update to a task's thread.
    ///
    /// The author must own the task or be in its share set; the role is
    /// snapshotted at post time. Answers are rejected here and go through
    /// [`RefinementThreadService::answer_question`].
    ///
    /// # Errors
    ///
    /// Returns [`RefinementThreadError::Domain`] wrapping
    /// [`RefinementDomainError::AnswerOutsideThread`] for answer kinds, in
    /// addition to the usual identity, lookup, and authorization failures.
    pub async fn add_refinement(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
        kind: RefinementKind,
        content: &str,
    ) -> RefinementThreadResult<Refinement> {
        let identity = identity.ok_or(RefinementThreadError::NotAuthenticated)?;
        let view = self
            .tasks
            .access_view(task_id)
            .await?
            .ok_or(RefinementThreadError::TaskNotFound(task_id))?;
        let role = self.resolve_role(&view, identity)?;
        let author = self.author_from(identity)?;

        let refinement = Refinement::post(task_id, author, role, kind, content, &*self.clock)?;
        self.repository.insert(&refinement).await?;
        Ok(refinement)
    }

    /// Answers a question on a task the caller owns.
    ///
    /// # Errors
    ///
    /// Returns [`RefinementThreadError::QuestionNotFound`] for unknown
    /// questions, [`RefinementThreadError::Domain`] wrapping
    /// [`RefinementDomainError::NotAQuestion`] when the referenced entry is
    /// not a question, and [`RefinementThreadError::NotAuthorized`] when
    /// the caller does not own the question's task.
    pub async fn answer_question(
        &self,
        identity: Option<&Identity>,
        question_id: RefinementId,
        content: &str,
    ) -> RefinementThreadResult<Refinement> {
        let identity = identity.ok_or(RefinementThreadError::NotAuthenticated)?;
        let question = self
            .repository
            .find(question_id)
            .await?
            .ok_or(RefinementThreadError::QuestionNotFound(question_id))?;
        let view = self
            .tasks
            .access_view(question.task_id())
            .await?
            .ok_or(RefinementThreadError::TaskNotFound(question.task_id()))?;
        if !view.is_owner(identity.subject()) {
            return Err(RefinementThreadError::NotAuthorized);
        }
        let author = self.author_from(identity)?;

        let answer = Refinement::answer_to(&question, author, content, &*self.clock)?;
        self.repository.insert(&answer).await?;
        Ok(answer)
    }

    /// Returns a task's whole thread ordered by creation time. Readable by
    /// the owner and share members; unauthenticated callers get an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`RefinementThreadError::NotAuthorized`] when the caller has
    /// no access, in addition to lookup failures.
    pub async fn refinements(
        &self,
        identity: Option<&Identity>,
        task_id: TaskId,
    ) -> RefinementThreadResult<Vec<Refinement>> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };
        let view = self
            .tasks
            .access_view(task_id)
            .await?
            .ok_or(RefinementThreadError::TaskNotFound(task_id))?;
        self.resolve_role(&view, identity)?;
        Ok(self.repository.list_for_task(task_id).await?)
    }

    /// Resolves the caller's role on the task for authorization and the
    /// post-time snapshot.
    fn resolve_role(
        &self,
        view: &TaskAccessView,
        identity: &Identity,
    ) -> RefinementThreadResult<AuthorRole> {
        if view.is_owner(identity.subject()) {
            return Ok(AuthorRole::Owner);
        }
        if identity
            .email()
            .is_some_and(|email| view.is_shared_with(email))
        {
            return Ok(AuthorRole::Collaborator);
        }
        Err(RefinementThreadError::NotAuthorized)
    }

    fn author_from(&self, identity: &Identity) -> RefinementThreadResult<Author> {
        let email = identity
            .email()
            .cloned()
            .ok_or(RefinementThreadError::EmailRequired)?;
        Ok(Author {
            subject: identity.subject().clone(),
            email,
            name: identity.name().map(str::to_owned),
        })
    }
}
