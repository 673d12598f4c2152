//! Repository ports for registry persistence and lookup.

use crate::identity::{EmailAddress, SubjectId};
use crate::project::domain::{
    Collaborator, CollaboratorId, Invitation, InvitationId, Project, ProjectId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry repository operations.
pub type RegistryRepositoryResult<T> = Result<T, RegistryRepositoryError>;

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryRepositoryError::DuplicateProject`] when the
    /// project ID already exists.
    async fn insert_project(&self, project: &Project) -> RegistryRepositoryResult<()>;

    /// Persists changes to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryRepositoryError::ProjectNotFound`] when the
    /// project does not exist.
    async fn update_project(&self, project: &Project) -> RegistryRepositoryResult<()>;

    /// Finds a project by identifier. Returns `None` when absent.
    async fn find_project(&self, id: ProjectId) -> RegistryRepositoryResult<Option<Project>>;

    /// Returns all projects owned by the given subject.
    async fn list_projects_owned_by(
        &self,
        owner: &SubjectId,
    ) -> RegistryRepositoryResult<Vec<Project>>;

    /// Hard-deletes a project. Referencing rows are left in place; readers
    /// tolerate the dangling reference as "project missing".
    ///
    /// # Errors
    ///
    /// Returns [`RegistryRepositoryError::ProjectNotFound`] when the
    /// project does not exist.
    async fn delete_project(&self, id: ProjectId) -> RegistryRepositoryResult<()>;
}

/// Collaborator membership persistence contract.
#[async_trait]
pub trait CollaboratorRepository: Send + Sync {
    /// Inserts or replaces the membership row keyed by
    /// `(project, subject)`.
    async fn upsert_collaborator(
        &self,
        collaborator: &Collaborator,
    ) -> RegistryRepositoryResult<()>;

    /// Finds a membership row by identifier. Returns `None` when absent.
    async fn find_collaborator(
        &self,
        id: CollaboratorId,
    ) -> RegistryRepositoryResult<Option<Collaborator>>;

    /// Finds the membership row for a subject on a project.
    async fn find_membership(
        &self,
        project_id: ProjectId,
        subject: &SubjectId,
    ) -> RegistryRepositoryResult<Option<Collaborator>>;

    /// Finds the membership row for an email on a project.
    async fn find_membership_by_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Option<Collaborator>>;

    /// Returns all membership rows for a project.
    async fn list_collaborators(
        &self,
        project_id: ProjectId,
    ) -> RegistryRepositoryResult<Vec<Collaborator>>;

    /// Returns all membership rows held by a subject across projects.
    async fn list_memberships(
        &self,
        subject: &SubjectId,
    ) -> RegistryRepositoryResult<Vec<Collaborator>>;

    /// Hard-deletes a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryRepositoryError::CollaboratorNotFound`] when the
    /// row does not exist.
    async fn remove_collaborator(&self, id: CollaboratorId) -> RegistryRepositoryResult<()>;
}

/// Invitation persistence contract.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Inserts or replaces the invitation keyed by `(project, email)`.
    ///
    /// This upsert is the idempotency guarantee for re-invites: the stored
    /// row is overwritten in place, never duplicated.
    async fn upsert_invitation(&self, invitation: &Invitation) -> RegistryRepositoryResult<()>;

    /// Persists changes to an existing invitation (responses, lazy expiry).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryRepositoryError::InvitationNotFound`] when the
    /// invitation does not exist.
    async fn update_invitation(&self, invitation: &Invitation) -> RegistryRepositoryResult<()>;

    /// Finds an invitation by its current link token.
    async fn find_invitation_by_token(
        &self,
        token: &str,
    ) -> RegistryRepositoryResult<Option<Invitation>>;

    /// Finds the invitation for an email on a project.
    async fn find_invitation_for_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Option<Invitation>>;

    /// Returns all invitations addressed to an email, any status.
    async fn list_invitations_for_email(
        &self,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Vec<Invitation>>;
}

/// Errors returned by registry repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryRepositoryError {
    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The collaborator row was not found.
    #[error("collaborator not found: {0}")]
    CollaboratorNotFound(CollaboratorId),

    /// The invitation was not found.
    #[error("invitation not found: {0}")]
    InvitationNotFound(InvitationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
